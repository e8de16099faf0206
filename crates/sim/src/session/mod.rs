//! Simulation lifecycle keyed by identifier.
//!
//! [`SimulationRepository`] is the boundary consumed by API or session
//! layers: create, step, inspect, run, summarize, and discard simulations by
//! [`SimulationId`].

mod repository;

pub use repository::SimulationRepository;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier handed out by a [`SimulationRepository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationId(u64);

impl SimulationId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sim-{}", self.0)
    }
}
