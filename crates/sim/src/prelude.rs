//! Commonly used imports for convenience.
//!
//! This prelude module provides a convenient way to import the most commonly
//! used types and traits in the epinet library.
//!
//! # Example
//!
//! ```
//! use epinet_sim::prelude::*;
//!
//! let mut sim = SimulationBuilder::new()
//!     .population_size(10)
//!     .transmission_prob(1.0)
//!     .complete()
//!     .seed(1)
//!     .build()
//!     .unwrap();
//! let snapshot = sim.step().unwrap();
//! assert_eq!(snapshot.counts.infected, 10);
//! ```

pub use crate::errors::{self, Result, SimulationError};
pub use crate::graph::{
    AdjacencyGraph, ContactGraph, ContactWeights, GraphBuilder, Layout, NodeId, Population,
    SpatialConfig, Topology,
};
pub use crate::metrics::{EpidemicMetrics, MetricsRecorder, SeriesPoint};
pub use crate::session::{SimulationId, SimulationRepository};
pub use crate::simulation::{
    Compartment, CompartmentCounts, RecoveryRule, SeedSet, Simulation, SimulationBuilder,
    SimulationParameters, SimulationState, Snapshot,
};
