use epinet_analysis::{CurveSummary, EnsembleSummary, Statistic};
use epinet_sim::graph::{ContactWeights, Topology};
use epinet_sim::simulation::{RecoveryRule, SeedSet, SimulationParameters};

use crate::config::ExperimentConfig;

pub fn print_experiment(config: &ExperimentConfig) {
    print_parameters(&config.parameters);
    println!("\n⏱  Run Settings");
    println!("  • Max Days: {} [-d, --max-days]", config.max_days);
    println!("  • Replicates: {} [-r, --replicates]", config.replicates);
    println!();
}

pub fn print_parameters(params: &SimulationParameters) {
    println!("\n📋 Simulation Configuration");
    println!(
        "  • Population Size: {} [-n, --population-size]",
        params.population_size
    );
    if let Some(seed) = params.seed {
        println!("  • Random Seed: {seed} [--seed]");
    } else {
        println!("  • Random Seed: Random [--seed]");
    }

    println!("\n🕸  Contact Network");
    match &params.topology {
        Topology::Complete => println!("  • Topology: Complete"),
        Topology::Ring { degree } => println!("  • Topology: Ring (degree {degree})"),
        Topology::ErdosRenyi { edge_prob } => {
            println!("  • Topology: Erdős–Rényi (edge prob {edge_prob:.4})")
        }
        Topology::SmallWorld {
            degree,
            rewire_prob,
        } => println!("  • Topology: Small World (degree {degree}, rewire {rewire_prob:.3})"),
        Topology::ScaleFree { attachment } => {
            println!("  • Topology: Scale Free (attachment {attachment})")
        }
    }
    match params.contact_weights {
        ContactWeights::Uniform => println!("  • Contact Weights: 1.0"),
        ContactWeights::Random { min, max } => {
            println!("  • Contact Weights: uniform in [{min:.2}, {max:.2}]")
        }
    }
    match &params.spatial {
        Some(spatial) => println!(
            "  • Spatial Mode: {:?} layout, length scale {:.3}",
            spatial.layout, spatial.length_scale
        ),
        None => println!("  • Spatial Mode: Disabled"),
    }

    println!("\n🦠 Transmission & Recovery");
    println!(
        "  • Transmission Probability: {:.4} [-p, --transmission-prob]",
        params.transmission_prob
    );
    match params.recovery {
        RecoveryRule::FixedDuration { days } => {
            println!("  • Recovery: after {days} days [--recovery-days]")
        }
        RecoveryRule::Probabilistic { prob } => {
            println!("  • Recovery: probability {prob:.4} per day [--recovery-prob]")
        }
    }
    match &params.initial_infected {
        SeedSet::Nodes(nodes) => println!("  • Initially Infected: nodes {nodes:?}"),
        SeedSet::Random { count } => println!("  • Initially Infected: {count} random nodes"),
    }
}

fn format_day(day: Option<u32>) -> String {
    day.map_or_else(|| "-".to_string(), |d| d.to_string())
}

pub fn print_curve_summary(summary: &CurveSummary, days: u32) {
    println!("\n📈 Epidemic Summary");
    println!("  • Days Simulated: {days}");
    println!(
        "  • Peak: {} infected on day {}",
        summary.peak_infected,
        format_day(summary.peak_day)
    );
    println!(
        "  • Peak Incidence Day: {}",
        format_day(summary.peak_incidence_day)
    );
    println!("  • Attack Rate: {:.2}%", summary.attack_rate * 100.0);
    match summary.duration {
        Some(d) => println!("  • Epidemic Ended: day {d}"),
        None => println!("  • Epidemic Ended: still active"),
    }
    println!("  • Approximate R0: {:.3}", summary.approximate_r0);
    if let Some(r) = summary.growth_rate {
        println!("  • Early Growth Rate: {r:.4} /day");
    }
    if let Some(t) = summary.doubling_time {
        println!("  • Doubling Time: {t:.2} days");
    }
}

fn print_statistic(label: &str, stat: &Statistic) {
    println!(
        "  • {label}: {:.3} ± {:.3}, median {:.3} (range {:.3} to {:.3})",
        stat.mean, stat.std_dev, stat.median, stat.min, stat.max
    );
}

pub fn print_ensemble_summary(summary: &EnsembleSummary) {
    println!("\n📊 Ensemble Summary ({} replicates)", summary.replicates);
    print_statistic("Peak Day", &summary.peak_day);
    print_statistic("Peak Infected", &summary.peak_infected);
    print_statistic("Attack Rate", &summary.attack_rate);
    print_statistic("Approximate R0", &summary.approximate_r0);
    println!(
        "  • Outbreak Fraction: {:.1}%",
        summary.outbreak_fraction * 100.0
    );
    if let Some((day, peak)) = summary
        .mean_infected
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
    {
        println!("  • Mean Curve Peak: {peak:.1} infected on day {day}");
    }
}
