use anyhow::{Context, Result};
use epinet_analysis::CurveSummary;
use epinet_sim::metrics::SeriesPoint;
use epinet_sim::simulation::{Simulation, Snapshot};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::args::RunFormat;
use crate::config::ExperimentConfig;
use crate::printing::{print_curve_summary, print_experiment};

pub struct RunOptions {
    pub seed: Option<u64>,
    pub max_days: Option<usize>,
    pub output: Option<PathBuf>,
    pub format: RunFormat,
    pub progress: bool,
}

pub fn run_simulation(config_path: &Path, options: &RunOptions) -> Result<()> {
    println!("🦠 epinet - Running Simulation");
    println!("============================================\n");

    let mut config = ExperimentConfig::load(config_path)?;
    if let Some(seed) = options.seed {
        config.parameters.seed = Some(seed);
    }
    if let Some(max_days) = options.max_days {
        config.max_days = max_days;
    }
    config.validate()?;

    let mut sim = Simulation::new(config.parameters.clone())
        .context("Failed to initialize simulation")?;

    println!("Configuration:");
    print_experiment(&config);
    println!("Running up to {} days (seed {})...", config.max_days, sim.seed());

    if options.progress {
        let pb = ProgressBar::new(config.max_days as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} days {msg}",
                )?
                .progress_chars("#>-"),
        );
        for _ in 0..config.max_days {
            if sim.is_extinct() {
                break;
            }
            let snapshot = sim.step().context("Simulation step failed")?;
            pb.set_message(format!("I={}", snapshot.counts.infected));
            pb.inc(1);
        }
        pb.finish_with_message("Done");
    } else {
        sim.run_to_completion(config.max_days)
            .context("Simulation run failed")?;
    }

    let metrics = sim.metrics();
    println!("\n✓ Simulation complete!");
    print_curve_summary(&CurveSummary::from_metrics(&metrics), metrics.days);

    if let Some(output) = &options.output {
        match options.format {
            RunFormat::Json => write_snapshots(output, sim.history())?,
            RunFormat::Csv => write_series(output, &metrics.series)?,
        }
        println!("\n✓ Results written: {}", output.display());
    }

    Ok(())
}

fn write_snapshots(path: &Path, snapshots: &[Snapshot]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, snapshots).context("Failed to write snapshots")?;
    writer.flush()?;
    Ok(())
}

fn write_series(path: &Path, series: &[SeriesPoint]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(
        writer,
        "day,susceptible,infected,recovered,new_infections,cumulative_infections"
    )?;
    for p in series {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            p.day, p.susceptible, p.infected, p.recovered, p.new_infections, p.cumulative_infections
        )?;
    }
    writer.flush()?;
    Ok(())
}
