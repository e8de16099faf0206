//! Contact graphs.
//!
//! The engine only needs a small read-only capability from a graph:
//! enumerate nodes, enumerate a node's weighted neighbours, and look up a
//! single edge weight. [`ContactGraph`] captures that, and
//! [`AdjacencyGraph`] is the compressed adjacency implementation produced by
//! [`GraphBuilder`].

pub mod builder;
pub mod spatial;
pub mod topology;

pub use builder::{GraphBuilder, Population};
pub use spatial::{Coordinate, Layout, SpatialConfig, SpatialIndex};
pub use topology::{ContactWeights, Topology};

use crate::errors::{Result, SimulationError};

/// Node identifier, dense in `[0, N)`.
pub type NodeId = usize;

/// An undirected contact between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    /// Contact weight in `(0, 1]` scaling transmission along this edge.
    pub weight: f64,
}

impl Edge {
    /// Create an edge with the default weight of 1.0.
    pub fn new(a: NodeId, b: NodeId) -> Self {
        Self { a, b, weight: 1.0 }
    }

    pub fn weighted(a: NodeId, b: NodeId, weight: f64) -> Self {
        Self { a, b, weight }
    }
}

/// Read-only graph capability required by the simulation engine.
pub trait ContactGraph {
    /// Number of nodes. Identifiers are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// All node identifiers in ascending order.
    fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        0..self.node_count()
    }

    /// Neighbours of `node` paired with the contact weight of the edge.
    fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_;

    /// Weight of the edge between `a` and `b`, if they are adjacent.
    fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<f64>;
}

/// Compressed sparse adjacency. Every undirected edge is stored once per
/// endpoint and neighbour lists are sorted by id.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyGraph {
    offsets: Vec<usize>,
    targets: Vec<NodeId>,
    weights: Vec<f64>,
}

impl AdjacencyGraph {
    /// Build a symmetric graph on `node_count` nodes from an edge list.
    ///
    /// Self-loops are dropped. When the same pair appears more than once the
    /// first weight wins. Fails if an endpoint is out of range or a weight
    /// lies outside `(0, 1]`.
    pub fn from_edges(node_count: usize, edges: impl IntoIterator<Item = Edge>) -> Result<Self> {
        let mut lists: Vec<Vec<(NodeId, f64)>> = vec![Vec::new(); node_count];

        for edge in edges {
            if edge.a >= node_count || edge.b >= node_count {
                return Err(SimulationError::config(format!(
                    "edge ({}, {}) references a node outside [0, {node_count})",
                    edge.a, edge.b
                )));
            }
            if !(edge.weight > 0.0 && edge.weight <= 1.0) {
                return Err(SimulationError::config(format!(
                    "edge ({}, {}) has weight {} outside (0, 1]",
                    edge.a, edge.b, edge.weight
                )));
            }
            if edge.a == edge.b {
                continue;
            }
            lists[edge.a].push((edge.b, edge.weight));
            lists[edge.b].push((edge.a, edge.weight));
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::new();
        let mut weights = Vec::new();
        offsets.push(0);

        for mut list in lists {
            // Stable sort keeps the first occurrence of a duplicate pair first.
            list.sort_by_key(|&(target, _)| target);
            list.dedup_by_key(|&mut (target, _)| target);
            for (target, weight) in list {
                targets.push(target);
                weights.push(weight);
            }
            offsets.push(targets.len());
        }

        Ok(Self {
            offsets,
            targets,
            weights,
        })
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.targets.len() / 2
    }

    /// Number of neighbours of `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.offsets[node + 1] - self.offsets[node]
    }

    /// Mean degree over all nodes.
    pub fn mean_degree(&self) -> f64 {
        if self.node_count() == 0 {
            return 0.0;
        }
        self.targets.len() as f64 / self.node_count() as f64
    }

    /// Sorted neighbour ids of `node`.
    pub fn neighbor_ids(&self, node: NodeId) -> &[NodeId] {
        &self.targets[self.offsets[node]..self.offsets[node + 1]]
    }

    /// Iterate over every undirected edge once, with `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.node_count()).flat_map(move |a| {
            self.neighbors(a)
                .filter(move |&(b, _)| a < b)
                .map(move |(b, weight)| Edge::weighted(a, b, weight))
        })
    }
}

impl ContactGraph for AdjacencyGraph {
    fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let range = self.offsets[node]..self.offsets[node + 1];
        self.targets[range.clone()]
            .iter()
            .copied()
            .zip(self.weights[range].iter().copied())
    }

    fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        if a >= self.node_count() {
            return None;
        }
        let start = self.offsets[a];
        self.neighbor_ids(a)
            .binary_search(&b)
            .ok()
            .map(|idx| self.weights[start + idx])
    }
}
