//! Random-graph models used to generate contact networks.

use super::{Edge, NodeId};
use crate::errors::{check_probability, Result, SimulationError};
use rand::seq::IndexedRandom;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

/// Graph-generation scheme determining the degree distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    /// Every pair of nodes is in contact.
    Complete,
    /// Ring lattice: each node touches `degree / 2` neighbours on either side.
    Ring { degree: usize },
    /// Uniform random graph: each pair is in contact with `edge_prob`.
    ErdosRenyi { edge_prob: f64 },
    /// Watts-Strogatz small world: a ring lattice whose edges are rewired
    /// with `rewire_prob`.
    SmallWorld { degree: usize, rewire_prob: f64 },
    /// Barabasi-Albert preferential attachment: each new node attaches to
    /// `attachment` existing nodes.
    ScaleFree { attachment: usize },
}

impl Default for Topology {
    fn default() -> Self {
        Self::Ring { degree: 2 }
    }
}

impl Topology {
    /// Short name used in logs and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Ring { .. } => "ring",
            Self::ErdosRenyi { .. } => "erdos_renyi",
            Self::SmallWorld { .. } => "small_world",
            Self::ScaleFree { .. } => "scale_free",
        }
    }

    /// Check the topology parameters against a population of `n` nodes.
    pub fn validate(&self, n: usize) -> Result<()> {
        match *self {
            Self::Complete => Ok(()),
            Self::Ring { degree } => check_lattice_degree(degree, n),
            Self::ErdosRenyi { edge_prob } => check_probability("edge_prob", edge_prob),
            Self::SmallWorld {
                degree,
                rewire_prob,
            } => {
                check_lattice_degree(degree, n)?;
                check_probability("rewire_prob", rewire_prob)
            }
            Self::ScaleFree { attachment } => {
                if attachment == 0 || attachment >= n {
                    return Err(SimulationError::config(format!(
                        "scale-free attachment must be in [1, {n}), got {attachment}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Generate the undirected edge list (unit weights) for `n` nodes.
    ///
    /// Callers must have run [`Topology::validate`] first.
    pub fn generate<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Edge> {
        let edges = match *self {
            Self::Complete => complete(n),
            Self::Ring { degree } => ring_lattice(n, degree),
            Self::ErdosRenyi { edge_prob } => erdos_renyi(n, edge_prob, rng),
            Self::SmallWorld {
                degree,
                rewire_prob,
            } => small_world(n, degree, rewire_prob, rng),
            Self::ScaleFree { attachment } => scale_free(n, attachment, rng),
        };
        trace!(topology = self.name(), nodes = n, edges = edges.len(), "generated edges");
        edges
    }
}

/// How contact weights are assigned to generated edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContactWeights {
    /// Every edge transmits at full strength.
    #[default]
    Uniform,
    /// Each edge draws its weight uniformly from `[min, max]`.
    Random { min: f64, max: f64 },
}

impl ContactWeights {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Uniform => Ok(()),
            Self::Random { min, max } => {
                if min > 0.0 && min <= max && max <= 1.0 {
                    Ok(())
                } else {
                    Err(SimulationError::config(format!(
                        "contact weights need 0 < min <= max <= 1, got [{min}, {max}]"
                    )))
                }
            }
        }
    }

    /// Overwrite the weight of every edge, in edge-list order.
    pub fn apply<R: Rng + ?Sized>(&self, edges: &mut [Edge], rng: &mut R) -> Result<()> {
        match *self {
            Self::Uniform => {
                for edge in edges.iter_mut() {
                    edge.weight = 1.0;
                }
            }
            Self::Random { min, max } => {
                let dist = Uniform::new_inclusive(min, max)
                    .map_err(|e| SimulationError::config(format!("contact weights: {e}")))?;
                for edge in edges.iter_mut() {
                    edge.weight = dist.sample(rng);
                }
            }
        }
        Ok(())
    }
}

fn check_lattice_degree(degree: usize, n: usize) -> Result<()> {
    if degree < 2 || degree % 2 != 0 || degree >= n {
        return Err(SimulationError::config(format!(
            "lattice degree must be even, at least 2 and below the population size {n}, got {degree}"
        )));
    }
    Ok(())
}

fn complete(n: usize) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for a in 0..n {
        for b in (a + 1)..n {
            edges.push(Edge::new(a, b));
        }
    }
    edges
}

fn ring_lattice(n: usize, degree: usize) -> Vec<Edge> {
    let half = degree / 2;
    let mut edges = Vec::with_capacity(n * half);
    for a in 0..n {
        for offset in 1..=half {
            edges.push(Edge::new(a, (a + offset) % n));
        }
    }
    edges
}

fn erdos_renyi<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> Vec<Edge> {
    let mut edges = Vec::new();
    for a in 0..n {
        for b in (a + 1)..n {
            if rng.random::<f64>() < p {
                edges.push(Edge::new(a, b));
            }
        }
    }
    edges
}

fn small_world<R: Rng + ?Sized>(n: usize, degree: usize, beta: f64, rng: &mut R) -> Vec<Edge> {
    let half = degree / 2;
    let mut adjacency: Vec<BTreeSet<NodeId>> = vec![BTreeSet::new(); n];
    for edge in ring_lattice(n, degree) {
        adjacency[edge.a].insert(edge.b);
        adjacency[edge.b].insert(edge.a);
    }

    for offset in 1..=half {
        for a in 0..n {
            let b = (a + offset) % n;
            if !adjacency[a].contains(&b) || rng.random::<f64>() >= beta {
                continue;
            }
            // A fully connected node has nowhere to rewire to.
            if adjacency[a].len() >= n - 1 {
                continue;
            }
            let mut target = rng.random_range(0..n);
            while target == a || adjacency[a].contains(&target) {
                target = rng.random_range(0..n);
            }
            adjacency[a].remove(&b);
            adjacency[b].remove(&a);
            adjacency[a].insert(target);
            adjacency[target].insert(a);
        }
    }

    adjacency
        .iter()
        .enumerate()
        .flat_map(|(a, targets)| {
            targets
                .iter()
                .filter(move |&&b| a < b)
                .map(move |&b| Edge::new(a, b))
        })
        .collect()
}

fn scale_free<R: Rng + ?Sized>(n: usize, m: usize, rng: &mut R) -> Vec<Edge> {
    // Seed core: a complete graph on m + 1 nodes.
    let core = m + 1;
    let mut edges = complete(core.min(n));
    // Each node appears once per incident edge, so uniform draws from this
    // list are degree-proportional.
    let mut endpoints: Vec<NodeId> = edges.iter().flat_map(|e| [e.a, e.b]).collect();

    for node in core..n {
        let mut chosen = BTreeSet::new();
        while chosen.len() < m {
            if let Some(&target) = endpoints.choose(rng) {
                chosen.insert(target);
            }
        }
        for target in chosen {
            edges.push(Edge::new(node, target));
            endpoints.push(node);
            endpoints.push(target);
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AdjacencyGraph, ContactGraph};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn build(topology: &Topology, n: usize, seed: u64) -> AdjacencyGraph {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        topology.validate(n).unwrap();
        AdjacencyGraph::from_edges(n, topology.generate(n, &mut rng)).unwrap()
    }

    #[test]
    fn test_complete_graph() {
        let graph = build(&Topology::Complete, 10, 1);
        assert_eq!(graph.edge_count(), 45);
        assert!((0..10).all(|v| graph.degree(v) == 9));
    }

    #[test]
    fn test_ring_lattice_degree() {
        let graph = build(&Topology::Ring { degree: 4 }, 20, 1);
        assert!((0..20).all(|v| graph.degree(v) == 4));
        assert_eq!(graph.neighbor_ids(0), &[1, 2, 18, 19]);
    }

    #[test]
    fn test_ring_validation() {
        assert!(Topology::Ring { degree: 3 }.validate(10).is_err());
        assert!(Topology::Ring { degree: 0 }.validate(10).is_err());
        assert!(Topology::Ring { degree: 10 }.validate(10).is_err());
        assert!(Topology::Ring { degree: 2 }.validate(3).is_ok());
    }

    #[test]
    fn test_erdos_renyi_extremes() {
        let empty = build(&Topology::ErdosRenyi { edge_prob: 0.0 }, 30, 3);
        assert_eq!(empty.edge_count(), 0);

        let full = build(&Topology::ErdosRenyi { edge_prob: 1.0 }, 30, 3);
        assert_eq!(full.edge_count(), 30 * 29 / 2);
    }

    #[test]
    fn test_erdos_renyi_density() {
        let n = 400;
        let p = 0.05;
        let graph = build(&Topology::ErdosRenyi { edge_prob: p }, n, 11);
        let expected = p * (n * (n - 1) / 2) as f64;
        let actual = graph.edge_count() as f64;
        assert!((actual - expected).abs() < expected * 0.15);
    }

    #[test]
    fn test_erdos_renyi_rejects_negative_probability() {
        assert!(Topology::ErdosRenyi { edge_prob: -0.2 }.validate(10).is_err());
    }

    #[test]
    fn test_small_world_preserves_edge_count() {
        let graph = build(
            &Topology::SmallWorld {
                degree: 4,
                rewire_prob: 0.3,
            },
            100,
            5,
        );
        assert_eq!(graph.edge_count(), 200);
    }

    #[test]
    fn test_small_world_without_rewiring_is_lattice() {
        let lattice = build(&Topology::Ring { degree: 4 }, 50, 9);
        let sw = build(
            &Topology::SmallWorld {
                degree: 4,
                rewire_prob: 0.0,
            },
            50,
            9,
        );
        assert_eq!(lattice, sw);
    }

    #[test]
    fn test_scale_free_edge_count_and_min_degree() {
        let n = 200;
        let m = 3;
        let graph = build(&Topology::ScaleFree { attachment: m }, n, 21);
        let core = m + 1;
        assert_eq!(graph.edge_count(), core * (core - 1) / 2 + (n - core) * m);
        assert!((0..n).all(|v| graph.degree(v) >= m));
    }

    #[test]
    fn test_scale_free_validation() {
        assert!(Topology::ScaleFree { attachment: 0 }.validate(10).is_err());
        assert!(Topology::ScaleFree { attachment: 10 }.validate(10).is_err());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let topology = Topology::SmallWorld {
            degree: 6,
            rewire_prob: 0.2,
        };
        assert_eq!(build(&topology, 80, 42), build(&topology, 80, 42));
    }

    #[test]
    fn test_random_contact_weights_within_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let mut edges = Topology::Complete.generate(12, &mut rng);
        let weights = ContactWeights::Random { min: 0.2, max: 0.6 };
        weights.validate().unwrap();
        weights.apply(&mut edges, &mut rng).unwrap();
        assert!(edges.iter().all(|e| (0.2..=0.6).contains(&e.weight)));
    }

    #[test]
    fn test_contact_weights_validation() {
        assert!(ContactWeights::Random { min: 0.0, max: 0.5 }.validate().is_err());
        assert!(ContactWeights::Random { min: 0.6, max: 0.5 }.validate().is_err());
        assert!(ContactWeights::Random { min: 0.5, max: 1.2 }.validate().is_err());
        assert!(ContactWeights::Random { min: 1.0, max: 1.0 }.validate().is_ok());
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Topology::Ring { degree: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"ring","degree":2}"#);
        let back: Topology = serde_json::from_str(r#"{"kind":"complete"}"#).unwrap();
        assert_eq!(back, Topology::Complete);
    }
}
