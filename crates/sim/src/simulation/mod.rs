//! Simulation engine and per-run state.
//!
//! This module provides the daily transmission/recovery loop and the state
//! it mutates.
//!
//! - `Simulation`: the engine that advances days and records snapshots.
//! - `SimulationState`: compartments, infection days and the infected frontier.
//! - `Snapshot`: immutable end-of-day record.
//! - `SimulationBuilder`: fluent builder for constructing `Simulation` instances
//!   with sensible defaults and validation.

pub mod builder;
pub mod engine;
pub mod frontier;
pub mod parameters;
pub mod state;

pub use builder::SimulationBuilder;
pub use engine::{RunStatus, Simulation};
pub use frontier::InfectionFrontier;
pub use parameters::{RecoveryRule, SeedSet, SimulationParameters};
pub use state::{Compartment, CompartmentCounts, SimulationState, Snapshot};
