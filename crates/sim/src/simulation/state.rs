//! Per-node compartments, simulation state, and daily snapshots.

use super::frontier::InfectionFrontier;
use crate::errors::{Result, SimulationError};
use crate::graph::{Coordinate, NodeId};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Epidemic compartment of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Compartment {
    #[serde(rename = "S")]
    Susceptible,
    #[serde(rename = "I")]
    Infected,
    #[serde(rename = "R")]
    Recovered,
}

impl Compartment {
    /// Whether one day can take a node from `self` to `next`: it either
    /// stays put or moves one stage along S -> I -> R.
    pub fn can_become(self, next: Compartment) -> bool {
        matches!(
            (self, next),
            (Self::Susceptible, Self::Susceptible | Self::Infected)
                | (Self::Infected, Self::Infected | Self::Recovered)
                | (Self::Recovered, Self::Recovered)
        )
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Susceptible => "S",
            Self::Infected => "I",
            Self::Recovered => "R",
        };
        f.write_str(code)
    }
}

/// Number of nodes in each compartment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentCounts {
    #[serde(rename = "S")]
    pub susceptible: usize,
    #[serde(rename = "I")]
    pub infected: usize,
    #[serde(rename = "R")]
    pub recovered: usize,
}

impl CompartmentCounts {
    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.recovered
    }

    /// Nodes that have ever been infected.
    pub fn ever_infected(&self) -> usize {
        self.infected + self.recovered
    }

    fn tally(compartments: &[Compartment]) -> Self {
        let mut counts = Self::default();
        for c in compartments {
            match c {
                Compartment::Susceptible => counts.susceptible += 1,
                Compartment::Infected => counts.infected += 1,
                Compartment::Recovered => counts.recovered += 1,
            }
        }
        counts
    }
}

/// Mutable state of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    day: u32,
    compartments: Vec<Compartment>,
    infection_days: Vec<Option<u32>>,
    frontier: InfectionFrontier,
    counts: CompartmentCounts,
}

impl SimulationState {
    /// Day-0 state with `seeds` Infected and everyone else Susceptible.
    pub fn initial(population_size: usize, seeds: &[NodeId]) -> Self {
        let mut state = Self {
            day: 0,
            compartments: vec![Compartment::Susceptible; population_size],
            infection_days: vec![None; population_size],
            frontier: InfectionFrontier::new(population_size),
            counts: CompartmentCounts {
                susceptible: population_size,
                ..Default::default()
            },
        };
        for &seed in seeds {
            state.infect(seed, 0);
        }
        state
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn population_size(&self) -> usize {
        self.compartments.len()
    }

    pub fn compartment(&self, node: NodeId) -> Option<Compartment> {
        self.compartments.get(node).copied()
    }

    pub fn compartments(&self) -> &[Compartment] {
        &self.compartments
    }

    /// Day on which `node` was infected: 0 for seeds, otherwise the day
    /// counter at the start of the step that infected it.
    pub fn infection_day(&self, node: NodeId) -> Option<u32> {
        self.infection_days.get(node).copied().flatten()
    }

    pub fn frontier(&self) -> &InfectionFrontier {
        &self.frontier
    }

    pub fn counts(&self) -> CompartmentCounts {
        self.counts
    }

    pub fn is_susceptible(&self, node: NodeId) -> bool {
        self.compartments[node] == Compartment::Susceptible
    }

    /// Move a Susceptible node to Infected. No-op for any other node.
    pub(crate) fn infect(&mut self, node: NodeId, day: u32) -> bool {
        if self.compartments[node] != Compartment::Susceptible {
            return false;
        }
        self.compartments[node] = Compartment::Infected;
        self.infection_days[node] = Some(day);
        self.frontier.insert(node);
        self.counts.susceptible -= 1;
        self.counts.infected += 1;
        true
    }

    /// Move an Infected node to Recovered. No-op for any other node.
    pub(crate) fn recover(&mut self, node: NodeId) -> bool {
        if self.compartments[node] != Compartment::Infected {
            return false;
        }
        self.compartments[node] = Compartment::Recovered;
        self.frontier.remove(node);
        self.counts.infected -= 1;
        self.counts.recovered += 1;
        true
    }

    pub(crate) fn advance_day(&mut self) {
        self.day += 1;
    }

    /// Verify the day-boundary invariants: conservation, counts matching the
    /// compartments, and the frontier equalling the Infected set.
    pub fn check_invariants(&self) -> Result<()> {
        let tallied = CompartmentCounts::tally(&self.compartments);
        if tallied != self.counts {
            return Err(SimulationError::InvalidState(format!(
                "day {}: cached counts {:?} disagree with compartments {:?}",
                self.day, self.counts, tallied
            )));
        }
        if self.counts.total() != self.population_size() {
            return Err(SimulationError::InvalidState(format!(
                "day {}: S + I + R = {} but N = {}",
                self.day,
                self.counts.total(),
                self.population_size()
            )));
        }
        if self.frontier.len() != self.counts.infected
            || self
                .frontier
                .iter()
                .any(|n| self.compartments[n] != Compartment::Infected)
        {
            return Err(SimulationError::InvalidState(format!(
                "day {}: frontier does not match the infected set",
                self.day
            )));
        }
        Ok(())
    }
}

/// Immutable record of the state at the end of a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub day: u32,
    pub counts: CompartmentCounts,
    /// Nodes that became Infected during the step producing this day
    pub new_infections: usize,
    #[serde(serialize_with = "ser_indexed", deserialize_with = "de_indexed")]
    pub node_states: Vec<Compartment>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_coordinates",
        deserialize_with = "de_coordinates"
    )]
    pub coordinates: Option<Arc<[Coordinate]>>,
}

impl Snapshot {
    pub fn capture(
        state: &SimulationState,
        new_infections: usize,
        coordinates: Option<Arc<[Coordinate]>>,
    ) -> Self {
        Self {
            day: state.day,
            counts: state.counts,
            new_infections,
            node_states: state.compartments.clone(),
            coordinates,
        }
    }

    pub fn state_of(&self, node: NodeId) -> Option<Compartment> {
        self.node_states.get(node).copied()
    }
}

fn ser_indexed<S, T>(values: &[T], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    serializer.collect_map(values.iter().enumerate())
}

fn de_indexed<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let map = BTreeMap::<NodeId, T>::deserialize(deserializer)?;
    let mut values = Vec::with_capacity(map.len());
    for (expected, (id, value)) in map.into_iter().enumerate() {
        if id != expected {
            return Err(D::Error::custom(format!(
                "node ids must be contiguous from 0, missing {expected}"
            )));
        }
        values.push(value);
    }
    Ok(values)
}

fn ser_coordinates<S>(
    coordinates: &Option<Arc<[Coordinate]>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match coordinates {
        Some(coords) => ser_indexed(&**coords, serializer),
        None => serializer.serialize_none(),
    }
}

fn de_coordinates<'de, D>(deserializer: D) -> std::result::Result<Option<Arc<[Coordinate]>>, D::Error>
where
    D: Deserializer<'de>,
{
    de_indexed::<D, Coordinate>(deserializer).map(|coords| Some(coords.into()))
}
