//! Builder pattern for creating simulations.
//!
//! Provides a fluent API for configuring and creating simulations with
//! sensible defaults. Validation happens once, in [`SimulationBuilder::build`].

use crate::errors::{Result, SimulationError};
use crate::graph::{ContactWeights, NodeId, SpatialConfig, Topology};
use crate::simulation::{RecoveryRule, SeedSet, Simulation, SimulationParameters};

/// Builder for constructing [`Simulation`] instances with a fluent API.
///
/// # Examples
///
/// ```
/// use epinet_sim::simulation::SimulationBuilder;
///
/// // Ring lattice with the default 14-day recovery
/// let sim = SimulationBuilder::new()
///     .population_size(100)
///     .transmission_prob(0.2)
///     .build()
///     .unwrap();
///
/// // Small-world network, probabilistic recovery, fixed seed
/// let mut sim = SimulationBuilder::new()
///     .population_size(500)
///     .transmission_prob(0.05)
///     .small_world(6, 0.1)
///     .recovery_prob(0.1)
///     .random_seeds(5)
///     .seed(42)
///     .build()
///     .unwrap();
/// sim.run_to_completion(365).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    // Required parameters
    population_size: Option<usize>,
    transmission_prob: Option<f64>,

    // Everything else falls back to SimulationParameters defaults
    topology: Topology,
    contact_weights: ContactWeights,
    recovery: RecoveryRule,
    initial_infected: SeedSet,
    seed: Option<u64>,
    spatial: Option<SpatialConfig>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing parameter set.
    pub fn from_parameters(params: SimulationParameters) -> Self {
        Self {
            population_size: Some(params.population_size),
            transmission_prob: Some(params.transmission_prob),
            topology: params.topology,
            contact_weights: params.contact_weights,
            recovery: params.recovery,
            initial_infected: params.initial_infected,
            seed: params.seed,
            spatial: params.spatial,
        }
    }

    /// Set the number of nodes (required).
    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = Some(size);
        self
    }

    /// Set the per-contact daily transmission probability (required).
    pub fn transmission_prob(mut self, prob: f64) -> Self {
        self.transmission_prob = Some(prob);
        self
    }

    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn complete(self) -> Self {
        self.topology(Topology::Complete)
    }

    /// Ring lattice where each node touches `degree` nearest neighbours.
    pub fn ring(self, degree: usize) -> Self {
        self.topology(Topology::Ring { degree })
    }

    pub fn erdos_renyi(self, edge_prob: f64) -> Self {
        self.topology(Topology::ErdosRenyi { edge_prob })
    }

    pub fn small_world(self, degree: usize, rewire_prob: f64) -> Self {
        self.topology(Topology::SmallWorld {
            degree,
            rewire_prob,
        })
    }

    pub fn scale_free(self, attachment: usize) -> Self {
        self.topology(Topology::ScaleFree { attachment })
    }

    /// Draw contact weights uniformly from `[min, max]`.
    pub fn random_weights(mut self, min: f64, max: f64) -> Self {
        self.contact_weights = ContactWeights::Random { min, max };
        self
    }

    /// Recover exactly `days` days after infection.
    pub fn fixed_recovery(mut self, days: u32) -> Self {
        self.recovery = RecoveryRule::FixedDuration { days };
        self
    }

    /// Recover with probability `prob` per infected day.
    pub fn recovery_prob(mut self, prob: f64) -> Self {
        self.recovery = RecoveryRule::Probabilistic { prob };
        self
    }

    /// Infect these nodes on day 0.
    pub fn seed_nodes(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.initial_infected = SeedSet::Nodes(nodes.into_iter().collect());
        self
    }

    /// Infect `count` random nodes on day 0.
    pub fn random_seeds(mut self, count: usize) -> Self {
        self.initial_infected = SeedSet::Random { count };
        self
    }

    /// Set the random seed for reproducibility.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable distance-modulated transmission.
    pub fn spatial(mut self, config: SpatialConfig) -> Self {
        self.spatial = Some(config);
        self
    }

    /// Assemble and validate the parameter set without building a graph.
    pub fn parameters(self) -> Result<SimulationParameters> {
        let population_size = self
            .population_size
            .ok_or_else(|| SimulationError::config("missing required parameter: population_size"))?;
        let transmission_prob = self.transmission_prob.ok_or_else(|| {
            SimulationError::config("missing required parameter: transmission_prob")
        })?;

        let params = SimulationParameters {
            population_size,
            topology: self.topology,
            contact_weights: self.contact_weights,
            transmission_prob,
            recovery: self.recovery,
            initial_infected: self.initial_infected,
            seed: self.seed,
            spatial: self.spatial,
        };
        params.validate()?;
        Ok(params)
    }

    /// Build and validate the simulation.
    pub fn build(self) -> Result<Simulation> {
        Simulation::new(self.parameters()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_minimal() {
        let sim = SimulationBuilder::new()
            .population_size(10)
            .transmission_prob(0.1)
            .build();

        assert!(sim.is_ok());
    }

    #[test]
    fn test_builder_with_seed() {
        let sim = SimulationBuilder::new()
            .population_size(10)
            .transmission_prob(0.1)
            .seed(42)
            .build()
            .unwrap();

        assert_eq!(sim.seed(), 42);
    }

    #[test]
    fn test_builder_missing_population_size() {
        let err = SimulationBuilder::new()
            .transmission_prob(0.1)
            .build()
            .unwrap_err();

        match err {
            SimulationError::Configuration(msg) => assert!(msg.contains("population_size")),
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_builder_missing_transmission_prob() {
        let err = SimulationBuilder::new()
            .population_size(10)
            .parameters()
            .unwrap_err();

        assert!(err.to_string().contains("transmission_prob"));
    }

    #[test]
    fn test_builder_invalid_transmission_prob() {
        let sim = SimulationBuilder::new()
            .population_size(10)
            .transmission_prob(1.5)
            .build();

        assert!(matches!(sim, Err(SimulationError::Configuration(_))));
    }

    #[test]
    fn test_builder_invalid_topology() {
        let sim = SimulationBuilder::new()
            .population_size(10)
            .transmission_prob(0.1)
            .ring(3)
            .build();

        assert!(sim.is_err());
    }

    #[test]
    fn test_builder_full_configuration() {
        let params = SimulationBuilder::new()
            .population_size(200)
            .transmission_prob(0.05)
            .scale_free(3)
            .random_weights(0.2, 0.8)
            .recovery_prob(0.1)
            .random_seeds(4)
            .seed(5)
            .spatial(SpatialConfig::default())
            .parameters()
            .unwrap();

        assert_eq!(params.topology, Topology::ScaleFree { attachment: 3 });
        assert_eq!(params.recovery, RecoveryRule::Probabilistic { prob: 0.1 });
        assert_eq!(params.initial_infected, SeedSet::Random { count: 4 });
        assert!(params.is_spatial());
    }

    #[test]
    fn test_from_parameters_round_trip() {
        let mut params = SimulationParameters::new(30, 0.3);
        params.seed = Some(8);
        let rebuilt = SimulationBuilder::from_parameters(params.clone())
            .parameters()
            .unwrap();
        assert_eq!(rebuilt, params);
    }
}
