mod args;
mod commands;
mod config;
pub mod defaults;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use args::{InitArgs, ReportFormat, RunFormat};
use commands::analyze::AnalyzeOptions;
use commands::run::RunOptions;
use commands::{analyze, init, run, validate};

/// epinet: An Epidemic Network Simulator
///
/// This tool simulates how an infection spreads through a population
/// connected by a contact network, one day at a time, using the
/// Susceptible-Infected-Recovered model.
#[derive(Parser, Debug)]
#[command(name = "epinet")]
#[command(author, version, about = "Simulates SIR epidemics on contact networks", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Log every simulated day (overridden by RUST_LOG)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new experiment configuration.
    ///
    /// Writes the parameters for a new experiment (population, network,
    /// transmission, recovery) to a JSON file but does not run it yet.
    Init(Box<InitArgs>),

    /// Check that a configuration file is complete and valid.
    Validate {
        /// Config file path
        #[arg(short, long, default_value = defaults::CONFIG_PATH)]
        config: PathBuf,

        /// Also build the contact network and report its size
        #[arg(long)]
        build: bool,
    },

    /// Run one simulation from a configuration file.
    ///
    /// Steps day by day until no node is infected or the day budget runs out.
    Run {
        /// Config file path
        #[arg(short, long, default_value = defaults::CONFIG_PATH)]
        config: PathBuf,

        /// Override random seed (default: use configured seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Override the maximum number of days
        #[arg(short = 'd', long)]
        max_days: Option<usize>,

        /// Write results to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: every snapshot as JSON, or the daily curve as CSV
        #[arg(short, long, value_enum, default_value_t = RunFormat::Json)]
        format: RunFormat,

        /// Show progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Run many replicates in parallel and summarize their outcomes.
    Analyze {
        /// Config file path
        #[arg(short, long, default_value = defaults::CONFIG_PATH)]
        config: PathBuf,

        /// Override the number of replicates
        #[arg(short, long)]
        replicates: Option<usize>,

        /// Override the maximum number of days
        #[arg(short = 'd', long)]
        max_days: Option<usize>,

        /// Override the base random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Reuse one contact network for every replicate
        #[arg(long)]
        shared_topology: bool,

        /// Output format (pretty, json)
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Pretty)]
        format: ReportFormat,

        /// Also write the JSON summary to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,epinet_sim=debug,epinet_analysis=debug"
    } else {
        "warn,epinet_sim=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Init(args) => {
            init::init_experiment(&args)?;
        }
        Commands::Validate { config, build } => {
            validate::validate_config(&config, build)?;
        }
        Commands::Run {
            config,
            seed,
            max_days,
            output,
            format,
            progress,
        } => {
            let options = RunOptions {
                seed,
                max_days,
                output,
                format,
                progress,
            };
            run::run_simulation(&config, &options)?;
        }
        Commands::Analyze {
            config,
            replicates,
            max_days,
            seed,
            shared_topology,
            format,
            output,
        } => {
            let options = AnalyzeOptions {
                replicates,
                max_days,
                seed,
                shared_topology,
                format,
                output,
            };
            analyze::analyze_experiment(&config, &options)?;
        }
    }

    Ok(())
}
