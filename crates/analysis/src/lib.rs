//! # Analysis Crate
//!
//! Statistics over epidemic curves produced by `epinet-sim`, for single runs
//! and for ensembles of replicates.

pub mod analysis;

pub use analysis::*;
