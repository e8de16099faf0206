//! Epidemic analysis tools for epinet
//!
//! This module provides analysis on top of simulation metrics:
//! - Curve statistics (attack rate, duration, growth rate, doubling time)
//! - Parallel replicate ensembles and their summaries

pub mod curve;
pub mod ensemble;
pub mod utils;

// Re-export commonly used functions
pub use curve::{
    attack_rate, doubling_time, epidemic_duration, growth_rate, peak_incidence_day, CurveSummary,
};
pub use ensemble::{
    ensemble_summary, run_ensemble, EnsembleConfig, EnsembleSummary, ReplicateResult, Statistic,
};
