//! # Simulation Crate
//!
//! The `sim` crate provides the core of the epidemic simulator: building a
//! contact graph for a population, advancing a discrete-time SIR process over
//! it one day at a time, and deriving epidemic-curve statistics from the
//! resulting daily snapshots.

pub mod errors;
pub mod graph;
pub mod metrics;
pub mod prelude;
pub mod session;
pub mod simulation;

pub use errors::{Result, SimulationError};
pub use session::{SimulationId, SimulationRepository};
pub use simulation::{Simulation, SimulationBuilder, SimulationParameters, Snapshot};
