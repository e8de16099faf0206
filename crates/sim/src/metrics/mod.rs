//! Epidemic-curve metrics derived from daily snapshots.

mod recorder;
pub mod types;

pub use recorder::MetricsRecorder;
pub use types::{EpidemicMetrics, SeriesPoint, R0_GROWTH_WINDOW};
