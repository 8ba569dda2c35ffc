//! K-Feasible Cut Enumeration
//!
//! A cut of a node is a set of leaves such that every path from a source to
//! the node passes through a leaf. Cuts are enumerated bottom-up by merging
//! the cuts of each gate's fanins, keeping only cuts with at most K leaves.
//! Majority gates merge three fanin cut sets instead of two.
//!
//! Truth tables are 16-bit, enough for the default K = 4. Leaf `i` of a cut
//! is variable `i` of its truth table.
//!
//! # References
//!
//! - Mishchenko, A., Chatterjee, S., & Brayton, R. (2006). DAG-aware AIG
//!   rewriting: A fresh look at combinational logic synthesis.

use mixsyn_net::{Network, Node, NodeId};
use std::collections::HashMap;

/// Maximum cut size (K in K-feasible cuts)
pub const DEFAULT_CUT_SIZE: usize = 4;

/// Maximum number of cuts to keep per node
pub const DEFAULT_MAX_CUTS: usize = 8;

/// Truth table of each cut variable
pub const VAR_MASKS: [u16; 4] = [0xAAAA, 0xCCCC, 0xF0F0, 0xFF00];

/// A cut of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cut {
    /// The leaves of the cut (sorted)
    pub leaves: Vec<NodeId>,
    /// Function of the node in terms of the leaves
    pub truth: u16,
}

impl Cut {
    /// Create a trivial cut containing just the node itself
    pub fn trivial(node: NodeId) -> Self {
        Self {
            leaves: vec![node],
            truth: VAR_MASKS[0],
        }
    }

    /// Get the size of this cut
    pub fn size(&self) -> usize {
        self.leaves.len()
    }

    /// Whether this is the trivial cut of `node`
    pub fn is_trivial(&self, node: NodeId) -> bool {
        self.leaves.len() == 1 && self.leaves[0] == node
    }

    /// Check if this cut dominates another (is a subset)
    pub fn dominates(&self, other: &Cut) -> bool {
        if self.leaves.len() > other.leaves.len() {
            return false;
        }
        self.leaves.iter().all(|l| other.leaves.contains(l))
    }

    /// Union of the leaves of several cuts
    fn merge_leaves(cuts: &[&Cut]) -> Vec<NodeId> {
        let mut leaves: Vec<NodeId> = cuts.iter().flat_map(|c| c.leaves.iter().copied()).collect();
        leaves.sort();
        leaves.dedup();
        leaves
    }
}

/// Parameters for cut enumeration
#[derive(Debug, Clone)]
pub struct CutParams {
    /// Maximum cut size (K)
    pub k: usize,
    /// Maximum cuts per node
    pub max_cuts: usize,
}

impl Default for CutParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_CUT_SIZE,
            max_cuts: DEFAULT_MAX_CUTS,
        }
    }
}

/// Cut set for a single node
#[derive(Debug, Clone, Default)]
pub struct CutSet {
    /// The cuts for this node
    pub cuts: Vec<Cut>,
}

impl CutSet {
    /// Add a cut to this set, maintaining dominance filtering
    pub fn add(&mut self, cut: Cut, max_cuts: usize) {
        if self.cuts.iter().any(|existing| existing.dominates(&cut)) {
            return;
        }
        self.cuts.retain(|existing| !cut.dominates(existing));

        if self.cuts.len() < max_cuts {
            self.cuts.push(cut);
        } else if let Some(largest_idx) = self
            .cuts
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| c.size())
            .map(|(i, _)| i)
        {
            if cut.size() < self.cuts[largest_idx].size() {
                self.cuts[largest_idx] = cut;
            }
        }
    }
}

/// Cuts for every node of a network
pub struct CutEnumeration {
    node_cuts: Vec<CutSet>,
}

impl CutEnumeration {
    /// Enumerate cuts for the given network
    pub fn enumerate(network: &Network, params: &CutParams) -> Self {
        let mut node_cuts: Vec<CutSet> = Vec::with_capacity(network.size());

        for (id, node) in network.iter_nodes() {
            let cut_set = match node {
                // The constant needs no leaves
                Node::Const => CutSet {
                    cuts: vec![Cut {
                        leaves: vec![],
                        truth: 0,
                    }],
                },
                Node::Input { .. } | Node::Latch { .. } => CutSet {
                    cuts: vec![Cut::trivial(id)],
                },
                Node::And { .. } | Node::Maj { .. } => {
                    let fanin_sets: Vec<&CutSet> = node
                        .fanins()
                        .iter()
                        .map(|s| &node_cuts[s.node.index()])
                        .collect();

                    let mut new_cuts = CutSet::default();
                    new_cuts.add(Cut::trivial(id), params.max_cuts);

                    for leaves in merged_leaf_sets(&fanin_sets, params.k) {
                        if let Some(truth) = cone_truth(network, id, &leaves) {
                            new_cuts.add(Cut { leaves, truth }, params.max_cuts);
                        }
                    }
                    new_cuts
                }
            };
            node_cuts.push(cut_set);
        }

        Self { node_cuts }
    }

    /// Cuts of a node
    pub fn cuts(&self, node: NodeId) -> &[Cut] {
        self.node_cuts
            .get(node.index())
            .map(|set| set.cuts.as_slice())
            .unwrap_or(&[])
    }
}

/// All K-feasible leaf unions picking one cut per fanin
fn merged_leaf_sets(fanin_sets: &[&CutSet], k: usize) -> Vec<Vec<NodeId>> {
    let mut partial: Vec<Vec<&Cut>> = vec![vec![]];
    for set in fanin_sets {
        let mut next = Vec::new();
        for prefix in &partial {
            for cut in &set.cuts {
                let mut combo = prefix.clone();
                combo.push(cut);
                if Cut::merge_leaves(&combo).len() <= k {
                    next.push(combo);
                }
            }
        }
        partial = next;
    }

    let mut result: Vec<Vec<NodeId>> = partial.iter().map(|c| Cut::merge_leaves(c)).collect();
    result.sort();
    result.dedup();
    result
}

/// Function of `root` in terms of `leaves`, or `None` if the leaves do not
/// cut every path from a source to `root`
pub fn cone_truth(network: &Network, root: NodeId, leaves: &[NodeId]) -> Option<u16> {
    let mut values: HashMap<NodeId, u16> = HashMap::new();
    values.insert(NodeId::CONST, 0);
    for (i, &leaf) in leaves.iter().enumerate() {
        values.insert(leaf, *VAR_MASKS.get(i)?);
    }

    let mut stack = vec![root];
    while let Some(&node_id) = stack.last() {
        if values.contains_key(&node_id) {
            stack.pop();
            continue;
        }
        let node = network.node(node_id)?;
        if !node.is_gate() {
            return None;
        }

        let fanins = node.fanins();
        let pending: Vec<NodeId> = fanins
            .iter()
            .map(|s| s.node)
            .filter(|f| !values.contains_key(f))
            .collect();
        if !pending.is_empty() {
            stack.extend(pending);
            continue;
        }

        let v: Vec<u16> = fanins
            .iter()
            .map(|s| {
                let x = values[&s.node];
                if s.inverted {
                    !x
                } else {
                    x
                }
            })
            .collect();
        let value = if v.len() == 2 {
            v[0] & v[1]
        } else {
            (v[0] & v[1]) | (v[0] & v[2]) | (v[1] & v[2])
        };
        values.insert(node_id, value);
        stack.pop();
    }

    values.get(&root).copied()
}
