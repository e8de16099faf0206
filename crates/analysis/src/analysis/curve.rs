//! Epidemic-curve statistics
//!
//! Quantities derived from a single run's daily series:
//! - Final attack rate
//! - Epidemic duration (days until no node is infected)
//! - Peak incidence day (most new infections)
//! - Early exponential growth rate and doubling time

use crate::analysis::utils::linear_slope;
use epinet_sim::metrics::{EpidemicMetrics, SeriesPoint, R0_GROWTH_WINDOW};
use serde::{Deserialize, Serialize};

/// Fraction of the population infected at any point by the last day.
pub fn attack_rate(series: &[SeriesPoint]) -> f64 {
    match series.last() {
        Some(last) if last.population() > 0 => {
            last.cumulative_infections as f64 / last.population() as f64
        }
        _ => 0.0,
    }
}

/// First day on which no node is infected, or `None` if the series ends
/// with infections still active.
pub fn epidemic_duration(series: &[SeriesPoint]) -> Option<u32> {
    series.iter().find(|p| p.infected == 0).map(|p| p.day)
}

/// Day with the most new infections, earliest on ties. `None` when nothing
/// beyond the seeds was ever infected.
pub fn peak_incidence_day(series: &[SeriesPoint]) -> Option<u32> {
    series
        .iter()
        .filter(|p| p.new_infections > 0)
        .fold(None, |best: Option<&SeriesPoint>, p| match best {
            Some(b) if b.new_infections >= p.new_infections => Some(b),
            _ => Some(p),
        })
        .map(|p| p.day)
}

/// Exponential growth rate r of prevalence during the early growth phase.
///
/// Fits `ln I(t) = a + r t` by least squares over the opening run of days
/// with strictly increasing prevalence, at most [`R0_GROWTH_WINDOW`] steps.
pub fn growth_rate(series: &[SeriesPoint]) -> Option<f64> {
    let mut phase: Vec<&SeriesPoint> = Vec::with_capacity(R0_GROWTH_WINDOW + 1);
    for point in series {
        let grows = match phase.last() {
            None => point.infected > 0,
            Some(prev) => point.infected > prev.infected,
        };
        if !grows {
            break;
        }
        phase.push(point);
        if phase.len() > R0_GROWTH_WINDOW {
            break;
        }
    }

    let days: Vec<f64> = phase.iter().map(|p| p.day as f64).collect();
    let log_prevalence: Vec<f64> = phase.iter().map(|p| (p.infected as f64).ln()).collect();
    linear_slope(&days, &log_prevalence)
}

/// Days for prevalence to double during early growth, `ln 2 / r`.
pub fn doubling_time(series: &[SeriesPoint]) -> Option<f64> {
    growth_rate(series)
        .filter(|&r| r > 0.0)
        .map(|r| std::f64::consts::LN_2 / r)
}

/// Every curve statistic for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSummary {
    pub peak_day: Option<u32>,
    pub peak_infected: usize,
    pub peak_incidence_day: Option<u32>,
    pub attack_rate: f64,
    pub duration: Option<u32>,
    pub approximate_r0: f64,
    pub growth_rate: Option<f64>,
    pub doubling_time: Option<f64>,
}

impl CurveSummary {
    pub fn from_metrics(metrics: &EpidemicMetrics) -> Self {
        let series = &metrics.series;
        Self {
            peak_day: metrics.peak_day,
            peak_infected: metrics.peak_infected,
            peak_incidence_day: peak_incidence_day(series),
            attack_rate: attack_rate(series),
            duration: epidemic_duration(series),
            approximate_r0: metrics.approximate_r0,
            growth_rate: growth_rate(series),
            doubling_time: doubling_time(series),
        }
    }
}
