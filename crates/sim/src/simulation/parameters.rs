//! Simulation parameters and configuration.
//!
//! This module provides the parameter structures that fully describe a run:
//! population and topology, transmission and recovery, the initial seed set,
//! the random seed, and optional spatial mode. All of them serialize to JSON
//! so a configuration file can reproduce a simulation exactly.

use crate::errors::{check_probability, Result, SimulationError};
use crate::graph::{ContactWeights, NodeId, SpatialConfig, Topology};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Rule moving Infected nodes to Recovered. The two modes are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecoveryRule {
    /// Recover exactly `days` days after infection.
    FixedDuration { days: u32 },
    /// Recover with probability `prob` on every day spent infected.
    Probabilistic { prob: f64 },
}

impl Default for RecoveryRule {
    fn default() -> Self {
        Self::FixedDuration { days: 14 }
    }
}

impl RecoveryRule {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::FixedDuration { days } if days == 0 => Err(SimulationError::config(
                "fixed recovery duration must be at least 1 day",
            )),
            Self::FixedDuration { .. } => Ok(()),
            Self::Probabilistic { prob } => check_probability("recovery prob", prob),
        }
    }
}

/// Initially infected nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSet {
    /// Explicit node ids. Duplicates are ignored.
    Nodes(Vec<NodeId>),
    /// `count` distinct nodes drawn at random from the population.
    Random { count: usize },
}

impl Default for SeedSet {
    fn default() -> Self {
        Self::Nodes(vec![0])
    }
}

impl SeedSet {
    pub fn validate(&self, population_size: usize) -> Result<()> {
        match self {
            Self::Nodes(nodes) => {
                if nodes.is_empty() {
                    return Err(SimulationError::config("initial infected set is empty"));
                }
                if let Some(bad) = nodes.iter().find(|&&id| id >= population_size) {
                    return Err(SimulationError::config(format!(
                        "initial infected node {bad} is outside [0, {population_size})"
                    )));
                }
                Ok(())
            }
            Self::Random { count } => {
                if *count == 0 || *count > population_size {
                    return Err(SimulationError::config(format!(
                        "random seed count must be in [1, {population_size}], got {count}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Resolve to a sorted, duplicate-free list of node ids.
    pub fn resolve<R: Rng + ?Sized>(&self, population_size: usize, rng: &mut R) -> Vec<NodeId> {
        let unique: BTreeSet<NodeId> = match self {
            Self::Nodes(nodes) => nodes.iter().copied().collect(),
            Self::Random { count } => {
                rand::seq::index::sample(rng, population_size, *count).into_iter().collect()
            }
        };
        unique.into_iter().collect()
    }
}

/// Complete description of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Number of nodes N
    pub population_size: usize,
    /// Contact network model
    #[serde(default)]
    pub topology: Topology,
    /// How contact weights are assigned to edges
    #[serde(default)]
    pub contact_weights: ContactWeights,
    /// Per-contact, per-day transmission probability p
    pub transmission_prob: f64,
    /// Recovery rule
    #[serde(default)]
    pub recovery: RecoveryRule,
    /// Initially infected nodes
    #[serde(default)]
    pub initial_infected: SeedSet,
    /// RNG seed; drawn at creation when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Distance-modulated transmission, when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial: Option<SpatialConfig>,
}

impl SimulationParameters {
    /// Parameters with defaults for everything except the population size
    /// and transmission probability.
    pub fn new(population_size: usize, transmission_prob: f64) -> Self {
        Self {
            population_size,
            topology: Topology::default(),
            contact_weights: ContactWeights::default(),
            transmission_prob,
            recovery: RecoveryRule::default(),
            initial_infected: SeedSet::default(),
            seed: None,
            spatial: None,
        }
    }

    /// Check every parameter. Nothing is built when this fails.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(SimulationError::config("population_size must be positive"));
        }
        check_probability("transmission_prob", self.transmission_prob)?;
        self.topology.validate(self.population_size)?;
        self.contact_weights.validate()?;
        self.recovery.validate()?;
        self.initial_infected.validate(self.population_size)?;
        if let Some(spatial) = &self.spatial {
            spatial.validate()?;
        }
        Ok(())
    }

    /// Fill in a random seed if none was given.
    pub fn with_resolved_seed(mut self) -> Self {
        if self.seed.is_none() {
            self.seed = Some(rand::rng().random());
        }
        self
    }

    pub fn is_spatial(&self) -> bool {
        self.spatial.is_some()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::config(format!("invalid parameters JSON: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimulationError::config(format!("failed to serialize parameters: {e}")))
    }
}
