//! Node coordinates and distance-based transmission scaling.

use super::{ContactGraph, NodeId};
use crate::errors::{Result, SimulationError};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Coordinate) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// How coordinates are laid out over the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Uniformly random positions in the unit square.
    #[default]
    Scatter,
    /// Node `i` sits at angle `2πi/N` on the unit circle.
    Circle,
}

/// Spatial mode settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialConfig {
    #[serde(default)]
    pub layout: Layout,
    /// Distance over which transmission decays by a factor of e.
    pub length_scale: f64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Scatter,
            length_scale: 0.25,
        }
    }
}

impl SpatialConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.length_scale.is_finite() && self.length_scale > 0.0) {
            return Err(SimulationError::config(format!(
                "spatial length_scale must be positive, got {}",
                self.length_scale
            )));
        }
        Ok(())
    }
}

/// Immutable mapping from node id to coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialIndex {
    coordinates: Vec<Coordinate>,
    length_scale: f64,
}

impl SpatialIndex {
    /// Build an index from explicit coordinates.
    pub fn new(coordinates: Vec<Coordinate>, length_scale: f64) -> Result<Self> {
        SpatialConfig {
            layout: Layout::Scatter,
            length_scale,
        }
        .validate()?;
        Ok(Self {
            coordinates,
            length_scale,
        })
    }

    /// Place every node of `graph` according to `config`.
    pub fn assign_coordinates<G, R>(graph: &G, config: &SpatialConfig, rng: &mut R) -> Result<Self>
    where
        G: ContactGraph,
        R: Rng + ?Sized,
    {
        config.validate()?;
        let n = graph.node_count();
        let coordinates = match config.layout {
            Layout::Scatter => {
                let unit = Uniform::new(0.0, 1.0)
                    .map_err(|e| SimulationError::config(format!("scatter layout: {e}")))?;
                graph
                    .node_ids()
                    .map(|_| Coordinate::new(unit.sample(rng), unit.sample(rng)))
                    .collect()
            }
            Layout::Circle => graph
                .node_ids()
                .map(|id| {
                    let angle = TAU * id as f64 / n as f64;
                    Coordinate::new(angle.cos(), angle.sin())
                })
                .collect(),
        };
        Ok(Self {
            coordinates,
            length_scale: config.length_scale,
        })
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn coordinate(&self, node: NodeId) -> Option<Coordinate> {
        self.coordinates.get(node).copied()
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    /// Transmission multiplier in `(0, 1]` for a contact between `a` and `b`.
    ///
    /// Unknown nodes get the neutral factor 1.0.
    pub fn proximity_factor(&self, a: NodeId, b: NodeId) -> f64 {
        match (self.coordinates.get(a), self.coordinates.get(b)) {
            (Some(ca), Some(cb)) => (-ca.distance(cb) / self.length_scale)
                .exp()
                .clamp(f64::MIN_POSITIVE, 1.0),
            _ => 1.0,
        }
    }
}
