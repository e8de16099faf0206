//! Streaming accumulation of epidemic-curve statistics.

use super::types::{EpidemicMetrics, SeriesPoint, R0_GROWTH_WINDOW};
use crate::errors::{Result, SimulationError};
use crate::simulation::Snapshot;

/// Consumes an ordered snapshot sequence and derives the epidemic curve,
/// the peak, and an early-growth R0 estimate.
///
/// Only the per-day counts are kept, never node states. Every statistic is
/// recomputed from the stored series, so repeated queries agree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsRecorder {
    series: Vec<SeriesPoint>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a recorder from a whole snapshot sequence.
    pub fn from_snapshots<'a>(snapshots: impl IntoIterator<Item = &'a Snapshot>) -> Result<Self> {
        let mut recorder = Self::new();
        for snapshot in snapshots {
            recorder.record(snapshot)?;
        }
        Ok(recorder)
    }

    /// Build a recorder from an existing series.
    pub fn from_series(series: Vec<SeriesPoint>) -> Result<Self> {
        let mut recorder = Self::new();
        for point in series {
            recorder.push(point)?;
        }
        Ok(recorder)
    }

    /// Append one snapshot. Days must be consecutive.
    pub fn record(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.push(SeriesPoint::from_snapshot(snapshot))
    }

    fn push(&mut self, point: SeriesPoint) -> Result<()> {
        if let Some(last) = self.series.last() {
            if point.day != last.day + 1 {
                return Err(SimulationError::InvalidState(format!(
                    "snapshot for day {} does not follow day {}",
                    point.day, last.day
                )));
            }
        }
        self.series.push(point);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Ordered `(day, S, I, R, new_infections)` rows.
    pub fn series(&self) -> &[SeriesPoint] {
        &self.series
    }

    /// Day with the maximum infected count, earliest day on ties.
    pub fn peak_day(&self) -> Option<u32> {
        self.peak().map(|p| p.day)
    }

    fn peak(&self) -> Option<&SeriesPoint> {
        self.series
            .iter()
            .fold(None, |best: Option<&SeriesPoint>, p| match best {
                Some(b) if b.infected >= p.infected => Some(b),
                _ => Some(p),
            })
    }

    /// Mean of `new_infections(d) / I(d-1)` over the first days of strictly
    /// increasing prevalence, at most [`R0_GROWTH_WINDOW`] of them.
    ///
    /// Returns 0.0 when prevalence never grows.
    pub fn approximate_r0(&self) -> f64 {
        let ratios: Vec<f64> = self
            .series
            .windows(2)
            .take_while(|w| w[1].infected > w[0].infected && w[0].infected > 0)
            .take(R0_GROWTH_WINDOW)
            .map(|w| w[1].new_infections as f64 / w[0].infected as f64)
            .collect();

        if ratios.is_empty() {
            0.0
        } else {
            ratios.iter().sum::<f64>() / ratios.len() as f64
        }
    }

    /// Fraction of the population infected at any point so far.
    pub fn attack_rate(&self) -> f64 {
        match self.series.last() {
            Some(last) if last.population() > 0 => {
                last.cumulative_infections as f64 / last.population() as f64
            }
            _ => 0.0,
        }
    }

    /// Series and summary statistics in one record.
    pub fn summary(&self) -> EpidemicMetrics {
        EpidemicMetrics {
            series: self.series.clone(),
            peak_day: self.peak_day(),
            peak_infected: self.peak().map_or(0, |p| p.infected),
            approximate_r0: self.approximate_r0(),
            attack_rate: self.attack_rate(),
            days: self.series.last().map_or(0, |p| p.day),
        }
    }
}
