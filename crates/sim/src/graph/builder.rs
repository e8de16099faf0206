//! Construction of the population graph from simulation parameters.

use super::{AdjacencyGraph, ContactGraph, NodeId, SpatialIndex};
use crate::errors::Result;
use crate::simulation::SimulationParameters;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, warn};

/// A built population: the contact graph, optional coordinates, and the
/// resolved initially infected nodes.
///
/// Immutable once built. Simulations hold it behind an `Arc`, so several
/// runs can share one topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Population<G = AdjacencyGraph> {
    graph: G,
    spatial: Option<SpatialIndex>,
    seeds: Vec<NodeId>,
    /// Parameters the population was generated from, seed included.
    /// `None` for populations assembled by hand.
    parameters: Option<SimulationParameters>,
}

impl<G: ContactGraph> Population<G> {
    /// Assemble a population from an existing graph.
    ///
    /// Simulations started on it take topology, weights and seed nodes from
    /// the population itself; only the size and spatial mode of their
    /// parameters are checked against it.
    pub fn new(graph: G, spatial: Option<SpatialIndex>, seeds: Vec<NodeId>) -> Self {
        Self {
            graph,
            spatial,
            seeds,
            parameters: None,
        }
    }

    /// Parameters this population was generated from, if any.
    pub fn parameters(&self) -> Option<&SimulationParameters> {
        self.parameters.as_ref()
    }

    /// Seed of the generator that produced the graph, if known.
    pub fn seed(&self) -> Option<u64> {
        self.parameters.as_ref().and_then(|p| p.seed)
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn spatial(&self) -> Option<&SpatialIndex> {
        self.spatial.as_ref()
    }

    /// Initially infected node ids, sorted and unique.
    pub fn seeds(&self) -> &[NodeId] {
        &self.seeds
    }

    pub fn size(&self) -> usize {
        self.graph.node_count()
    }
}

/// Builds [`Population`]s. Holds no state between builds.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    /// Validate `params` and build the population graph.
    ///
    /// Deterministic for a given `params.seed`. When no seed is set one is
    /// drawn from the thread RNG and recorded on the population, so
    /// [`Population::seed`] can always rebuild it.
    pub fn build(params: &SimulationParameters) -> Result<Population> {
        let params = params.clone().with_resolved_seed();
        params.validate()?;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.seed.unwrap_or_default());
        Self::build_with_rng(&params, &mut rng)
    }

    /// Build using a caller-supplied generator. `params` must already be
    /// validated. They are recorded on the population as given.
    pub fn build_with_rng<R: Rng + ?Sized>(
        params: &SimulationParameters,
        rng: &mut R,
    ) -> Result<Population> {
        let n = params.population_size;

        let mut edges = params.topology.generate(n, rng);
        params.contact_weights.apply(&mut edges, rng)?;
        let graph = AdjacencyGraph::from_edges(n, edges)?;

        let spatial = params
            .spatial
            .as_ref()
            .map(|config| SpatialIndex::assign_coordinates(&graph, config, rng))
            .transpose()?;

        let seeds = params.initial_infected.resolve(n, rng);
        let isolated = seeds.iter().filter(|&&s| graph.degree(s) == 0).count();
        if isolated > 0 {
            warn!(isolated, "initial infected nodes without contacts");
        }

        debug!(
            topology = params.topology.name(),
            nodes = n,
            edges = graph.edge_count(),
            mean_degree = graph.mean_degree(),
            seeds = seeds.len(),
            spatial = spatial.is_some(),
            "built population graph"
        );

        Ok(Population {
            graph,
            spatial,
            seeds,
            parameters: Some(params.clone()),
        })
    }
}
