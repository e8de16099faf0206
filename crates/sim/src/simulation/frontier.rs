//! Tracking of the currently infected nodes.

use crate::graph::NodeId;

const ABSENT: usize = usize::MAX;

/// Set of Infected node ids with O(1) insert, remove and membership.
///
/// Members live in a dense vector so a step scans only active spreaders.
/// Iteration order depends only on the sequence of inserts and removes,
/// never on hashing, so runs stay reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfectionFrontier {
    members: Vec<NodeId>,
    /// Position of each node in `members`, or `ABSENT`
    slots: Vec<usize>,
}

impl InfectionFrontier {
    /// Empty frontier over a population of `capacity` nodes.
    pub fn new(capacity: usize) -> Self {
        Self {
            members: Vec::new(),
            slots: vec![ABSENT; capacity],
        }
    }

    /// Insert `node`. Returns false if it was already present.
    pub fn insert(&mut self, node: NodeId) -> bool {
        if self.slots[node] != ABSENT {
            return false;
        }
        self.slots[node] = self.members.len();
        self.members.push(node);
        true
    }

    /// Remove `node`. Returns false if it was not present.
    pub fn remove(&mut self, node: NodeId) -> bool {
        let slot = self.slots[node];
        if slot == ABSENT {
            return false;
        }
        self.members.swap_remove(slot);
        if let Some(&moved) = self.members.get(slot) {
            self.slots[moved] = slot;
        }
        self.slots[node] = ABSENT;
        true
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.slots.get(node).is_some_and(|&slot| slot != ABSENT)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Current members, in frontier order.
    pub fn as_slice(&self) -> &[NodeId] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }

    /// Members in ascending id order.
    pub fn sorted(&self) -> Vec<NodeId> {
        let mut nodes = self.members.clone();
        nodes.sort_unstable();
        nodes
    }
}
