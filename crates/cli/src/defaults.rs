//! Shared default values for experiment configuration.
//! These values are used by the `init` command (via clap) and by the other
//! commands when an option is not given.

pub const EXPERIMENT_NAME: &str = "epidemic";
pub const CONFIG_PATH: &str = "epidemic.json";

pub const POPULATION_SIZE: usize = 1000;

// Topology
pub const DEGREE: usize = 6;
pub const EDGE_PROB: f64 = 0.01;
pub const REWIRE_PROB: f64 = 0.1;
pub const ATTACHMENT: usize = 3;

// Transmission and recovery
pub const TRANSMISSION_PROB: f64 = 0.05;
pub const RECOVERY_DAYS: u32 = 14;

pub const LENGTH_SCALE: f64 = 0.25;

// Run settings
pub const MAX_DAYS: usize = 365;
pub const REPLICATES: usize = 20;
