//! Regions and sub-network extraction
//!
//! A [`Region`] is a set of partitions optimized as one unit. Extraction cuts
//! the region's gates out of the global network into a standalone
//! [`SubNetwork`] whose primary inputs are the region's leaves and whose
//! primary outputs are its roots. The original node IDs of both are kept so
//! the optimized logic can be re-bound afterwards.

use crate::error::NetResult;
use crate::network::{Network, Node, NodeId, Signal};
use crate::partition::{PartitionId, PartitionView};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A set of partitions treated as one optimization unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    partitions: BTreeSet<PartitionId>,
}

impl Region {
    /// Create a region from a set of partitions
    pub fn new(partitions: impl IntoIterator<Item = PartitionId>) -> Self {
        Self {
            partitions: partitions.into_iter().collect(),
        }
    }

    /// A region holding exactly one partition
    pub fn single(id: PartitionId) -> Self {
        Self::new([id])
    }

    /// Partitions in ascending order
    pub fn partitions(&self) -> impl Iterator<Item = PartitionId> + '_ {
        self.partitions.iter().copied()
    }

    /// Number of partitions in the region
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether the region holds no partitions
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Whether a partition is part of this region
    pub fn contains(&self, id: PartitionId) -> bool {
        self.partitions.contains(&id)
    }

    /// Smallest partition ID, used to order regions
    pub fn first(&self) -> Option<PartitionId> {
        self.partitions.iter().next().copied()
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, p) in self.partitions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, "}}")
    }
}

/// A region of a network cut out as a standalone network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubNetwork {
    /// The extracted logic
    pub network: Network,
    /// Original node driving each sub-network primary input
    pub leaves: Vec<NodeId>,
    /// Original gate behind each sub-network primary output
    pub roots: Vec<NodeId>,
}

impl SubNetwork {
    /// Cut the gates of `region` out of `network`.
    ///
    /// Gates are copied verbatim, so the extracted network has the same
    /// structure (and gate count) as the region in the original.
    pub fn extract(network: &Network, view: &PartitionView<'_>, region: &Region) -> NetResult<Self> {
        for p in region.partitions() {
            view.info(p)?;
        }

        let in_region = |id: NodeId| {
            region.contains(view.partition_of(id))
                && network.node(id).is_some_and(Node::is_gate)
        };

        let mut leaves = BTreeSet::new();
        let mut roots = BTreeSet::new();

        for (id, node) in network.iter_gates() {
            let member = in_region(id);
            for s in node.fanins() {
                if s.is_const() {
                    continue;
                }
                if member && !in_region(s.node) {
                    leaves.insert(s.node);
                } else if !member && in_region(s.node) {
                    roots.insert(s.node);
                }
            }
        }
        for s in network.sinks() {
            if in_region(s.node) {
                roots.insert(s.node);
            }
        }

        let name = format!("{}_{}", network.name, region);
        let mut sub = Network::new(name);
        let mut map: HashMap<NodeId, Signal> = HashMap::new();
        map.insert(NodeId::CONST, Signal::FALSE);

        for &leaf in &leaves {
            let id = sub.add_input(network.node_name(leaf));
            map.insert(leaf, Signal::new(id));
        }

        for (id, node) in network.iter_gates() {
            if !in_region(id) {
                continue;
            }
            let remap = |s: Signal| map[&s.node].invert_if(s.inverted);
            let copy = match node {
                Node::And { left, right } => Node::And {
                    left: remap(*left),
                    right: remap(*right),
                },
                Node::Maj { a, b, c } => Node::Maj {
                    a: remap(*a),
                    b: remap(*b),
                    c: remap(*c),
                },
                _ => continue,
            };
            let new_id = sub.push_node(copy);
            map.insert(id, Signal::new(new_id));
        }

        for &root in &roots {
            sub.add_output(root.to_string(), map[&root]);
        }

        tracing::trace!(
            "Extracted region {}: {} gates, {} leaves, {} roots",
            region,
            sub.num_gates(),
            leaves.len(),
            roots.len()
        );

        Ok(Self {
            network: sub,
            leaves: leaves.into_iter().collect(),
            roots: roots.into_iter().collect(),
        })
    }

    /// Whether the region contains no logic
    pub fn is_empty(&self) -> bool {
        self.network.num_gates() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::PartitionManager;

    fn two_stage() -> (Network, PartitionManager) {
        let mut ntk = Network::new("top");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let c = Signal::new(ntk.add_input("c"));
        let ab = ntk.add_and(a, b);
        let m = ntk.add_maj(ab, c, a);
        ntk.add_output("y", m);
        ntk.add_output("t", ab.invert());

        // const, a, b, c, ab, m
        let assignment = [0, 0, 0, 0, 0, 1].into_iter().map(PartitionId).collect();
        let manager = PartitionManager::new(&ntk, assignment).unwrap();
        (ntk, manager)
    }

    #[test]
    fn test_region_display_and_order() {
        let region = Region::new([PartitionId(4), PartitionId(1)]);
        assert_eq!(region.to_string(), "{P1, P4}");
        assert_eq!(region.first(), Some(PartitionId(1)));
        assert!(region.contains(PartitionId(4)));
    }

    #[test]
    fn test_extract_first_stage() {
        let (ntk, manager) = two_stage();
        let view = manager.view(&ntk).unwrap();
        let sub = SubNetwork::extract(&ntk, &view, &Region::single(PartitionId(0))).unwrap();

        assert_eq!(sub.leaves, vec![NodeId(1), NodeId(2)]);
        assert_eq!(sub.roots, vec![NodeId(4)]);
        assert_eq!(sub.network.num_gates(), 1);
        assert_eq!(sub.network.num_inputs(), 2);
        assert_eq!(sub.network.outputs()[0].0, "n4");
    }

    #[test]
    fn test_extract_second_stage() {
        let (ntk, manager) = two_stage();
        let view = manager.view(&ntk).unwrap();
        let sub = SubNetwork::extract(&ntk, &view, &Region::single(PartitionId(1))).unwrap();

        // Reads a, c and the AND gate from P0
        assert_eq!(sub.leaves, vec![NodeId(1), NodeId(3), NodeId(4)]);
        assert_eq!(sub.roots, vec![NodeId(5)]);
        assert_eq!(sub.network.num_majs(), 1);
    }

    #[test]
    fn test_extract_whole_network() {
        let (ntk, manager) = two_stage();
        let view = manager.view(&ntk).unwrap();
        let region = Region::new([PartitionId(0), PartitionId(1)]);
        let sub = SubNetwork::extract(&ntk, &view, &region).unwrap();

        assert_eq!(sub.network.num_gates(), ntk.num_gates());
        assert_eq!(sub.network.depth(), ntk.depth());
        assert_eq!(sub.roots, vec![NodeId(4), NodeId(5)]);
    }

    #[test]
    fn test_extract_region_without_gates() {
        let mut ntk = Network::new("wire");
        let a = Signal::new(ntk.add_input("a"));
        ntk.add_output("y", a);
        let manager = PartitionManager::single(&ntk, PartitionId(0));
        let view = manager.view(&ntk).unwrap();

        let sub = SubNetwork::extract(&ntk, &view, &Region::single(PartitionId(0))).unwrap();
        assert!(sub.is_empty());
        assert!(sub.leaves.is_empty());
        assert!(sub.roots.is_empty());
    }
}
