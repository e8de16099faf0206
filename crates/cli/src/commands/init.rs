use anyhow::{bail, Context, Result};
use epinet_sim::graph::{ContactWeights, Layout, SpatialConfig, Topology};
use epinet_sim::simulation::{RecoveryRule, SeedSet, SimulationParameters};

use crate::args::{InitArgs, LayoutKind, TopologyKind};
use crate::config::ExperimentConfig;
use crate::defaults;
use crate::printing::print_experiment;

pub fn init_experiment(args: &InitArgs) -> Result<()> {
    println!("🦠 epinet - Epidemic Network Simulator");
    println!("============================================\n");
    println!("Initializing experiment: {}", args.name);

    if args.output.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            args.output.display()
        );
    }

    let config = build_config(args)?;
    config.validate()?;

    println!("\nConfiguration:");
    print_experiment(&config);

    config.save(&args.output)?;

    println!("✓ Config written: {}", args.output.display());
    println!("\nExperiment initialized successfully!");
    println!("  Name: {}", config.name);
    println!("  Population size: {}", config.parameters.population_size);
    println!("\n💡 Use 'epinet run -c {}' to start the simulation", args.output.display());

    Ok(())
}

pub fn build_config(args: &InitArgs) -> Result<ExperimentConfig> {
    let topology = match args.topology {
        TopologyKind::Complete => Topology::Complete,
        TopologyKind::Ring => Topology::Ring {
            degree: args.degree,
        },
        TopologyKind::ErdosRenyi => Topology::ErdosRenyi {
            edge_prob: args.edge_prob,
        },
        TopologyKind::SmallWorld => Topology::SmallWorld {
            degree: args.degree,
            rewire_prob: args.rewire_prob,
        },
        TopologyKind::ScaleFree => Topology::ScaleFree {
            attachment: args.attachment,
        },
    };

    let contact_weights = match args.random_weights.as_deref() {
        Some(&[min, max]) => ContactWeights::Random { min, max },
        Some(other) => bail!("--random-weights takes exactly two values, got {}", other.len()),
        None => ContactWeights::Uniform,
    };

    let recovery = match (args.recovery_days, args.recovery_prob) {
        (_, Some(prob)) => RecoveryRule::Probabilistic { prob },
        (Some(days), None) => RecoveryRule::FixedDuration { days },
        (None, None) => RecoveryRule::FixedDuration {
            days: defaults::RECOVERY_DAYS,
        },
    };

    let initial_infected = match (&args.seed_nodes, args.random_seeds) {
        (Some(nodes), _) => SeedSet::Nodes(nodes.clone()),
        (None, Some(count)) => SeedSet::Random { count },
        (None, None) => SeedSet::default(),
    };

    let spatial = args.spatial.then(|| SpatialConfig {
        layout: match args.layout {
            LayoutKind::Scatter => Layout::Scatter,
            LayoutKind::Circle => Layout::Circle,
        },
        length_scale: args.length_scale,
    });

    let parameters = SimulationParameters {
        population_size: args.population_size,
        topology,
        contact_weights,
        transmission_prob: args.transmission_prob,
        recovery,
        initial_infected,
        seed: args.seed,
        spatial,
    };
    parameters
        .validate()
        .context("Invalid simulation parameters")?;

    Ok(ExperimentConfig {
        name: args.name.clone(),
        parameters,
        max_days: args.max_days,
        replicates: args.replicates,
    })
}
