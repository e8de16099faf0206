use anyhow::{Context, Result};
use epinet_sim::graph::GraphBuilder;
use std::path::Path;

use crate::config::ExperimentConfig;
use crate::printing::print_experiment;

pub fn validate_config(path: &Path, build_graph: bool) -> Result<()> {
    println!("🔍 Validating config: {}", path.display());

    let config = ExperimentConfig::load(path)?;
    config.validate()?;
    println!("✓ Parameters: OK");

    if build_graph {
        let population =
            GraphBuilder::build(&config.parameters).context("Failed to build contact network")?;
        let graph = population.graph();
        println!(
            "✓ Contact network: {} nodes, {} edges, mean degree {:.2}",
            population.size(),
            graph.edge_count(),
            graph.mean_degree()
        );
        let isolated = population
            .seeds()
            .iter()
            .filter(|&&s| graph.degree(s) == 0)
            .count();
        if isolated > 0 {
            println!("⚠️  {isolated} initially infected node(s) have no contacts");
        }
    }

    print_experiment(&config);
    println!("✓ Configuration is valid");

    Ok(())
}
