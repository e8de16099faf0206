//! Replicate ensembles
//!
//! Runs many independent replicates of one parameter set in parallel and
//! summarizes the spread of their outcomes.

use crate::analysis::curve::CurveSummary;
use crate::analysis::utils::{mean, median, std_dev};
use epinet_sim::graph::{GraphBuilder, Population};
use epinet_sim::metrics::EpidemicMetrics;
use epinet_sim::simulation::{Simulation, SimulationParameters};
use epinet_sim::{Result, SimulationError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How replicates are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleConfig {
    pub replicates: usize,
    /// Step budget for each replicate
    pub max_days: usize,
    /// Build the graph once and reuse it for every replicate, so only
    /// transmission randomness varies.
    #[serde(default)]
    pub shared_topology: bool,
}

impl EnsembleConfig {
    pub fn new(replicates: usize, max_days: usize) -> Self {
        Self {
            replicates,
            max_days,
            shared_topology: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.replicates == 0 {
            return Err(SimulationError::Configuration(
                "replicates must be positive".to_string(),
            ));
        }
        if self.max_days == 0 {
            return Err(SimulationError::Configuration(
                "max_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a single replicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateResult {
    pub replicate: usize,
    pub seed: u64,
    pub summary: CurveSummary,
    pub metrics: EpidemicMetrics,
}

/// Mean, median, spread and range of one statistic across replicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    pub mean: f64,
    /// Robust to the bimodal split between outbreaks and early extinctions
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Statistic {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                median: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        Self {
            mean: mean(values),
            median: median(values),
            std_dev: std_dev(values),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Aggregate over all replicates of an ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSummary {
    pub replicates: usize,
    pub peak_day: Statistic,
    pub peak_infected: Statistic,
    pub attack_rate: Statistic,
    pub approximate_r0: Statistic,
    /// Fraction of replicates in which infection spread beyond the seeds
    pub outbreak_fraction: f64,
    /// Mean infected count per day. Replicates that ended early hold their
    /// last value.
    pub mean_infected: Vec<f64>,
}

impl EnsembleSummary {
    pub fn from_results(results: &[ReplicateResult]) -> Self {
        let outbreaks = results
            .iter()
            .filter(|r| r.summary.peak_incidence_day.is_some())
            .count();
        let outbreak_fraction = if results.is_empty() {
            0.0
        } else {
            outbreaks as f64 / results.len() as f64
        };

        Self {
            replicates: results.len(),
            peak_day: statistic_of(results, |r| r.summary.peak_day.unwrap_or_default() as f64),
            peak_infected: statistic_of(results, |r| r.summary.peak_infected as f64),
            attack_rate: statistic_of(results, |r| r.summary.attack_rate),
            approximate_r0: statistic_of(results, |r| r.summary.approximate_r0),
            outbreak_fraction,
            mean_infected: mean_infected_curve(results),
        }
    }
}

fn statistic_of(results: &[ReplicateResult], f: impl Fn(&ReplicateResult) -> f64) -> Statistic {
    let values: Vec<f64> = results.iter().map(f).collect();
    Statistic::from_values(&values)
}

fn mean_infected_curve(results: &[ReplicateResult]) -> Vec<f64> {
    let len = results
        .iter()
        .map(|r| r.metrics.series.len())
        .max()
        .unwrap_or(0);

    (0..len)
        .map(|day| {
            let values: Vec<f64> = results
                .iter()
                .filter_map(|r| {
                    let series = &r.metrics.series;
                    series.get(day).or(series.last()).map(|p| p.infected as f64)
                })
                .collect();
            mean(&values)
        })
        .collect()
}

/// Seed for replicate `index` of an ensemble rooted at `base_seed`.
pub fn replicate_seed(base_seed: u64, index: usize) -> u64 {
    base_seed.wrapping_add(index as u64)
}

/// Run every replicate in parallel.
///
/// Replicate `i` uses seed `base + i`, where `base` is the parameters' seed
/// (drawn at random when absent), so an ensemble with a fixed seed is
/// reproducible regardless of thread scheduling.
pub fn run_ensemble(
    params: &SimulationParameters,
    config: &EnsembleConfig,
) -> Result<Vec<ReplicateResult>> {
    config.validate()?;
    let params = params.clone().with_resolved_seed();
    params.validate()?;
    let base_seed = params.seed.unwrap_or_default();

    let template: Option<Arc<Population>> = if config.shared_topology {
        Some(Arc::new(GraphBuilder::build(&params)?))
    } else {
        None
    };

    let results = (0..config.replicates)
        .into_par_iter()
        .map(|replicate| -> Result<ReplicateResult> {
            let seed = replicate_seed(base_seed, replicate);
            let mut replicate_params = params.clone();
            replicate_params.seed = Some(seed);

            let mut sim = match &template {
                Some(population) => {
                    Simulation::with_population(replicate_params, Arc::clone(population))?
                }
                None => Simulation::new(replicate_params)?,
            };
            sim.run_to_completion(config.max_days)?;

            let metrics = sim.metrics();
            Ok(ReplicateResult {
                replicate,
                seed,
                summary: CurveSummary::from_metrics(&metrics),
                metrics,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        replicates = results.len(),
        base_seed,
        shared_topology = config.shared_topology,
        "ensemble complete"
    );
    Ok(results)
}

/// Run an ensemble and summarize it.
pub fn ensemble_summary(
    params: &SimulationParameters,
    config: &EnsembleConfig,
) -> Result<EnsembleSummary> {
    run_ensemble(params, config).map(|results| EnsembleSummary::from_results(&results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use epinet_sim::graph::Topology;

    fn params() -> SimulationParameters {
        let mut params = SimulationParameters::new(80, 0.3);
        params.topology = Topology::ErdosRenyi { edge_prob: 0.08 };
        params.seed = Some(1234);
        params
    }

    #[test]
    fn test_ensemble_is_reproducible() {
        let config = EnsembleConfig::new(8, 100);
        let a = run_ensemble(&params(), &config).unwrap();
        let b = run_ensemble(&params(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_replicates_are_ordered_and_seeded() {
        let config = EnsembleConfig::new(5, 50);
        let results = run_ensemble(&params(), &config).unwrap();
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.replicate, i);
            assert_eq!(result.seed, replicate_seed(1234, i));
        }
    }

    #[test]
    fn test_zero_replicates_rejected() {
        let config = EnsembleConfig::new(0, 50);
        assert!(matches!(
            run_ensemble(&params(), &config),
            Err(SimulationError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut bad = params();
        bad.transmission_prob = -1.0;
        assert!(run_ensemble(&bad, &EnsembleConfig::new(3, 10)).is_err());
    }

    #[test]
    fn test_shared_topology_ensemble() {
        let mut config = EnsembleConfig::new(6, 100);
        config.shared_topology = true;
        let summary = ensemble_summary(&params(), &config).unwrap();
        assert_eq!(summary.replicates, 6);
        assert!(summary.attack_rate.min <= summary.attack_rate.mean);
        assert!(summary.attack_rate.mean <= summary.attack_rate.max);
    }

    #[test]
    fn test_summary_of_deterministic_saturation() {
        let mut p = SimulationParameters::new(10, 1.0);
        p.topology = Topology::Complete;
        p.seed = Some(0);
        let summary = ensemble_summary(&p, &EnsembleConfig::new(4, 30)).unwrap();

        assert_eq!(summary.attack_rate.mean, 1.0);
        assert_eq!(summary.attack_rate.median, 1.0);
        assert_eq!(summary.attack_rate.std_dev, 0.0);
        assert_eq!(summary.peak_infected.mean, 10.0);
        assert_eq!(summary.outbreak_fraction, 1.0);
        assert_eq!(summary.mean_infected[0], 1.0);
        assert_eq!(summary.mean_infected[1], 10.0);
    }

    #[test]
    fn test_statistic_median_resists_outliers() {
        let stat = Statistic::from_values(&[0.02, 0.8, 0.01, 0.85, 0.82]);
        assert_eq!(stat.median, 0.8);
        assert!(stat.mean < stat.median);
    }

    #[test]
    fn test_statistic_from_values() {
        let stat = Statistic::from_values(&[1.0, 2.0, 3.0]);
        assert_eq!(stat.mean, 2.0);
        assert_eq!(stat.median, 2.0);
        assert_eq!(stat.min, 1.0);
        assert_eq!(stat.max, 3.0);
        assert!((stat.std_dev - 1.0).abs() < 1e-12);
        assert_eq!(Statistic::from_values(&[]).mean, 0.0);
    }
}
