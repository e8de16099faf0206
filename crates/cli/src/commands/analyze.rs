use anyhow::{Context, Result};
use epinet_analysis::{run_ensemble, EnsembleSummary};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::args::ReportFormat;
use crate::config::ExperimentConfig;
use crate::printing::{print_ensemble_summary, print_experiment};

pub struct AnalyzeOptions {
    pub replicates: Option<usize>,
    pub max_days: Option<usize>,
    pub seed: Option<u64>,
    pub shared_topology: bool,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
}

pub fn analyze_experiment(config_path: &Path, options: &AnalyzeOptions) -> Result<()> {
    let mut config = ExperimentConfig::load(config_path)?;
    if let Some(replicates) = options.replicates {
        config.replicates = replicates;
    }
    if let Some(max_days) = options.max_days {
        config.max_days = max_days;
    }
    if let Some(seed) = options.seed {
        config.parameters.seed = Some(seed);
    }
    config.validate()?;

    let mut ensemble = config.ensemble();
    ensemble.shared_topology = options.shared_topology;

    let pretty = options.format == ReportFormat::Pretty;
    if pretty {
        println!("🦠 epinet - Ensemble Analysis");
        println!("============================================\n");
        print_experiment(&config);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Running {} replicates...", ensemble.replicates));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let results = run_ensemble(&config.parameters, &ensemble);
    spinner.finish_and_clear();

    let results = results.context("Ensemble run failed")?;
    let summary = EnsembleSummary::from_results(&results);

    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
    match options.format {
        ReportFormat::Pretty => print_ensemble_summary(&summary),
        ReportFormat::Json if options.output.is_none() => println!("{json}"),
        ReportFormat::Json => {}
    }

    if let Some(output) = &options.output {
        fs::write(output, &json)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        if pretty {
            println!("\n✓ Summary written: {}", output.display());
        }
    }

    Ok(())
}
