use crate::simulation::Snapshot;
use serde::{Deserialize, Serialize};

/// Maximum number of growth days averaged by the R0 estimate.
pub const R0_GROWTH_WINDOW: usize = 5;

/// One row of the epidemic curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub day: u32,
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
    pub new_infections: usize,
    /// Nodes ever infected by the end of this day (I + R)
    pub cumulative_infections: usize,
}

impl SeriesPoint {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let counts = snapshot.counts;
        Self {
            day: snapshot.day,
            susceptible: counts.susceptible,
            infected: counts.infected,
            recovered: counts.recovered,
            new_infections: snapshot.new_infections,
            cumulative_infections: counts.ever_infected(),
        }
    }

    pub fn population(&self) -> usize {
        self.susceptible + self.infected + self.recovered
    }
}

/// Epidemic curve plus summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpidemicMetrics {
    pub series: Vec<SeriesPoint>,
    /// Day with the most infected nodes, earliest on ties
    pub peak_day: Option<u32>,
    pub peak_infected: usize,
    pub approximate_r0: f64,
    /// Fraction of the population ever infected by the last recorded day
    pub attack_rate: f64,
    /// Last recorded day
    pub days: u32,
}
