//! Partition Manager and Partition View
//!
//! An upstream partitioner assigns every node of a network to exactly one
//! partition. The [`PartitionManager`] owns that assignment; the
//! [`PartitionView`] is a read-only accessor that derives per-partition
//! membership, boundary signals and inter-partition connectivity.
//!
//! # Boundary model
//!
//! - **inputs**: leaf nodes whose values the partition's gates read. These are
//!   gates of other partitions, plus primary inputs and latch outputs
//!   (which are sources regardless of where they are assigned).
//! - **outputs**: gates of the partition whose values are read by another
//!   partition, by any latch next-state input, or by a primary output.
//! - **feedthroughs**: primary inputs or latch outputs assigned to the
//!   partition that are consumed outside it without passing through any of
//!   its gates.
//!
//! The constant node is shared by every partition and never forms a boundary.

use crate::error::{NetError, NetResult};
use crate::network::{Network, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Partition identifier assigned by the upstream partitioner
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PartitionId(pub u32);

impl std::fmt::Display for PartitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Owns the node → partition mapping for one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionManager {
    /// One partition per node, indexed by node ID
    assignment: Vec<PartitionId>,
}

impl PartitionManager {
    /// Create a partition manager, checking that every node is assigned
    pub fn new(network: &Network, assignment: Vec<PartitionId>) -> NetResult<Self> {
        if assignment.len() != network.size() {
            return Err(NetError::AssignmentMismatch {
                assigned: assignment.len(),
                nodes: network.size(),
            });
        }
        Ok(Self { assignment })
    }

    /// Put every node of the network into a single partition
    pub fn single(network: &Network, id: PartitionId) -> Self {
        Self {
            assignment: vec![id; network.size()],
        }
    }

    /// Partition a node belongs to
    pub fn partition_of(&self, node: NodeId) -> PartitionId {
        self.assignment[node.index()]
    }

    /// The raw assignment, indexed by node ID
    pub fn assignment(&self) -> &[PartitionId] {
        &self.assignment
    }

    /// Number of distinct partitions
    pub fn num_partitions(&self) -> usize {
        self.assignment.iter().collect::<BTreeSet<_>>().len()
    }

    /// Check that this manager describes the given network
    pub fn matches(&self, network: &Network) -> bool {
        self.assignment.len() == network.size()
    }

    /// Build a read-only view over the network
    pub fn view<'a>(&'a self, network: &'a Network) -> NetResult<PartitionView<'a>> {
        PartitionView::new(network, self)
    }
}

/// Derived information about one partition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionInfo {
    /// Member nodes in topological order
    pub nodes: Vec<NodeId>,
    /// Leaf nodes the partition's gates read
    pub inputs: BTreeSet<NodeId>,
    /// Member gates read from outside the partition
    pub outputs: BTreeSet<NodeId>,
    /// Member sources consumed outside the partition
    pub feedthroughs: BTreeSet<NodeId>,
    /// Partitions sharing at least one boundary signal
    pub adjacent: BTreeSet<PartitionId>,
}

impl PartitionInfo {
    /// Number of member gates
    pub fn gate_count(&self, network: &Network) -> usize {
        self.nodes
            .iter()
            .filter(|&&n| network.node(n).is_some_and(Node::is_gate))
            .count()
    }
}

/// Read-only accessor over a fixed partitioning of a network
#[derive(Debug, Clone)]
pub struct PartitionView<'a> {
    network: &'a Network,
    manager: &'a PartitionManager,
    partitions: BTreeMap<PartitionId, PartitionInfo>,
}

impl<'a> PartitionView<'a> {
    /// Derive membership and boundaries for every partition
    pub fn new(network: &'a Network, manager: &'a PartitionManager) -> NetResult<Self> {
        if !manager.matches(network) {
            return Err(NetError::AssignmentMismatch {
                assigned: manager.assignment().len(),
                nodes: network.size(),
            });
        }

        let mut partitions: BTreeMap<PartitionId, PartitionInfo> = BTreeMap::new();
        for (id, _) in network.iter_nodes() {
            partitions
                .entry(manager.partition_of(id))
                .or_default()
                .nodes
                .push(id);
        }

        // Gate fanins
        for (id, node) in network.iter_gates() {
            let p = manager.partition_of(id);
            for s in node.fanins() {
                if s.is_const() {
                    continue;
                }
                let q = manager.partition_of(s.node);
                let is_gate = network.node(s.node).is_some_and(Node::is_gate);
                if q != p || !is_gate {
                    partitions.entry(p).or_default().inputs.insert(s.node);
                }
                if q != p {
                    record_crossing(&mut partitions, s.node, q, p, is_gate);
                }
            }
        }

        // Latch next-state inputs
        for (latch, _, data, _) in network.latches() {
            if data.is_const() {
                continue;
            }
            let p = manager.partition_of(latch);
            let q = manager.partition_of(data.node);
            let is_gate = network.node(data.node).is_some_and(Node::is_gate);
            if is_gate {
                partitions.entry(q).or_default().outputs.insert(data.node);
            }
            if q != p {
                record_crossing(&mut partitions, data.node, q, p, is_gate);
            }
        }

        // Primary outputs
        for (_, s) in network.outputs() {
            if s.is_const() {
                continue;
            }
            let q = manager.partition_of(s.node);
            let info = partitions.entry(q).or_default();
            if network.node(s.node).is_some_and(Node::is_gate) {
                info.outputs.insert(s.node);
            } else {
                info.feedthroughs.insert(s.node);
            }
        }

        Ok(Self {
            network,
            manager,
            partitions,
        })
    }

    /// The underlying network
    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// The underlying partition manager
    pub fn manager(&self) -> &'a PartitionManager {
        self.manager
    }

    /// All partition IDs in ascending order
    pub fn partition_ids(&self) -> Vec<PartitionId> {
        self.partitions.keys().copied().collect()
    }

    /// Number of partitions
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether the view holds no partitions
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Partition a node belongs to
    pub fn partition_of(&self, node: NodeId) -> PartitionId {
        self.manager.partition_of(node)
    }

    /// Derived information about a partition
    pub fn info(&self, id: PartitionId) -> NetResult<&PartitionInfo> {
        self.partitions
            .get(&id)
            .ok_or(NetError::UnknownPartition(id))
    }

    /// Member nodes of a partition
    pub fn nodes(&self, id: PartitionId) -> NetResult<&[NodeId]> {
        Ok(&self.info(id)?.nodes)
    }

    /// Boundary inputs of a partition
    pub fn inputs(&self, id: PartitionId) -> NetResult<&BTreeSet<NodeId>> {
        Ok(&self.info(id)?.inputs)
    }

    /// Boundary outputs of a partition
    pub fn outputs(&self, id: PartitionId) -> NetResult<&BTreeSet<NodeId>> {
        Ok(&self.info(id)?.outputs)
    }

    /// Feedthrough signals of a partition
    pub fn feedthroughs(&self, id: PartitionId) -> NetResult<&BTreeSet<NodeId>> {
        Ok(&self.info(id)?.feedthroughs)
    }

    /// Partitions sharing at least one boundary signal with `id`
    pub fn adjacent(&self, id: PartitionId) -> NetResult<&BTreeSet<PartitionId>> {
        Ok(&self.info(id)?.adjacent)
    }

    /// Signals crossing between two partitions, in either direction
    pub fn boundary_signals(&self, a: PartitionId, b: PartitionId) -> NetResult<Vec<NodeId>> {
        let info_a = self.info(a)?;
        let info_b = self.info(b)?;
        let from_b: BTreeSet<NodeId> = info_a
            .inputs
            .iter()
            .copied()
            .filter(|&n| self.partition_of(n) == b)
            .collect();
        let from_a: BTreeSet<NodeId> = info_b
            .inputs
            .iter()
            .copied()
            .filter(|&n| self.partition_of(n) == a)
            .collect();
        let mut crossing: BTreeSet<NodeId> = from_a.union(&from_b).copied().collect();

        for (latch, _, data, _) in self.network.latches() {
            if data.is_const() {
                continue;
            }
            let pair = (self.partition_of(latch), self.partition_of(data.node));
            if pair == (a, b) || pair == (b, a) {
                crossing.insert(data.node);
            }
        }
        Ok(crossing.into_iter().collect())
    }

    /// Total number of gates across all partitions
    pub fn total_gates(&self) -> usize {
        self.network.num_gates()
    }
}

fn record_crossing(
    partitions: &mut BTreeMap<PartitionId, PartitionInfo>,
    node: NodeId,
    owner: PartitionId,
    reader: PartitionId,
    is_gate: bool,
) {
    let info = partitions.entry(owner).or_default();
    if is_gate {
        info.outputs.insert(node);
    } else {
        info.feedthroughs.insert(node);
    }
    info.adjacent.insert(reader);
    partitions.entry(reader).or_default().adjacent.insert(owner);
}
