use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::defaults;

/// Contact network model selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopologyKind {
    Complete,
    Ring,
    ErdosRenyi,
    SmallWorld,
    ScaleFree,
}

/// Coordinate layout for spatial mode.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutKind {
    Scatter,
    Circle,
}

/// Output format for `run`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunFormat {
    /// Every daily snapshot, with node states
    Json,
    /// One row per day of the epidemic curve
    Csv,
}

/// Output format for `analyze`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Pretty,
    Json,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Experiment name
    #[arg(short = 'N', long, default_value = defaults::EXPERIMENT_NAME)]
    pub name: String,

    /// Output configuration file
    #[arg(short, long, default_value = defaults::CONFIG_PATH)]
    pub output: PathBuf,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,

    /// Population size (number of nodes)
    #[arg(short = 'n', long, default_value_t = defaults::POPULATION_SIZE)]
    pub population_size: usize,

    /// Contact network model
    #[arg(long, value_enum, default_value_t = TopologyKind::SmallWorld)]
    pub topology: TopologyKind,

    /// Lattice degree for ring and small-world networks (even)
    #[arg(long, default_value_t = defaults::DEGREE)]
    pub degree: usize,

    /// Edge probability for Erdős–Rényi networks
    #[arg(long, default_value_t = defaults::EDGE_PROB)]
    pub edge_prob: f64,

    /// Rewiring probability for small-world networks
    #[arg(long, default_value_t = defaults::REWIRE_PROB)]
    pub rewire_prob: f64,

    /// Edges added per node in scale-free networks
    #[arg(long, default_value_t = defaults::ATTACHMENT)]
    pub attachment: usize,

    /// Draw contact weights uniformly from [MIN, MAX] instead of using 1.0
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    pub random_weights: Option<Vec<f64>>,

    /// Per-contact daily transmission probability
    #[arg(short = 'p', long, default_value_t = defaults::TRANSMISSION_PROB)]
    pub transmission_prob: f64,

    /// Fixed infectious period in days
    #[arg(long, conflicts_with = "recovery_prob")]
    pub recovery_days: Option<u32>,

    /// Daily recovery probability (instead of a fixed period)
    #[arg(long)]
    pub recovery_prob: Option<f64>,

    /// Initially infected node ids
    #[arg(long, value_delimiter = ',', conflicts_with = "random_seeds")]
    pub seed_nodes: Option<Vec<usize>>,

    /// Number of initially infected nodes chosen at random
    #[arg(long)]
    pub random_seeds: Option<usize>,

    /// Enable distance-modulated transmission
    #[arg(long)]
    pub spatial: bool,

    /// Coordinate layout in spatial mode
    #[arg(long, value_enum, default_value_t = LayoutKind::Scatter, requires = "spatial")]
    pub layout: LayoutKind,

    /// Distance over which transmission decays by a factor of e
    #[arg(long, default_value_t = defaults::LENGTH_SCALE, requires = "spatial")]
    pub length_scale: f64,

    /// Maximum number of days to simulate
    #[arg(short = 'd', long, default_value_t = defaults::MAX_DAYS)]
    pub max_days: usize,

    /// Replicates for `analyze`
    #[arg(short = 'r', long, default_value_t = defaults::REPLICATES)]
    pub replicates: usize,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}
