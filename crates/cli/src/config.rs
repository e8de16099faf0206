//! Experiment configuration files.

use anyhow::{bail, Context, Result};
use epinet_analysis::EnsembleConfig;
use epinet_sim::simulation::SimulationParameters;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::defaults;

/// Everything needed to reproduce an experiment: the simulation parameters
/// plus how long to run and how many replicates to analyze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub name: String,
    pub parameters: SimulationParameters,
    #[serde(default = "default_max_days")]
    pub max_days: usize,
    #[serde(default = "default_replicates")]
    pub replicates: usize,
}

fn default_max_days() -> usize {
    defaults::MAX_DAYS
}

fn default_replicates() -> usize {
    defaults::REPLICATES
}

impl ExperimentConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(path = %path.display(), name = %config.name, "loaded experiment config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// Check run settings and every simulation parameter.
    pub fn validate(&self) -> Result<()> {
        if self.max_days == 0 {
            bail!("max_days must be positive");
        }
        if self.replicates == 0 {
            bail!("replicates must be positive");
        }
        self.parameters
            .validate()
            .context("Invalid simulation parameters")?;
        Ok(())
    }

    pub fn ensemble(&self) -> EnsembleConfig {
        EnsembleConfig::new(self.replicates, self.max_days)
    }
}
