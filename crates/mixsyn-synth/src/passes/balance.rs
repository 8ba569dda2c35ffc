//! Tree Balancing Pass
//!
//! Balances AND trees to minimize logic depth. All leaves of a node's AND
//! cone are collected and recombined, always joining the two shallowest
//! signals first, so chains of ANDs become trees of logarithmic depth.
//! Majority gates are copied unchanged.
//!
//! # References
//!
//! - Cortadella, J. (2003). Timing-driven logic bi-decomposition.
//! - ABC User Guide: `balance` command for AIG tree balancing.

use super::{build_gate, rebuild, remap, LevelTracker, Pass, PassResult};
use mixsyn_net::{Network, Node, Signal};

/// Tree balancing pass
pub struct Balance {
    /// Number of AND cones rebuilt
    rebalanced_count: usize,
}

/// Collect all leaves of an AND cone rooted at the given signal
///
/// A leaf is either:
/// - An input, latch or constant
/// - A complemented signal (can't expand through NOT)
/// - An AND node with multiple fanouts (can't be absorbed)
/// - A majority node
fn collect_leaves(network: &Network, root: Signal, fanout: &[u32], leaves: &mut Vec<Signal>) {
    let mut stack = vec![(root, true)];
    while let Some((s, is_root)) = stack.pop() {
        match network.node(s.node) {
            Some(Node::And { left, right })
                if !s.inverted && (is_root || fanout[s.node.index()] <= 1) =>
            {
                stack.push((*right, false));
                stack.push((*left, false));
            }
            _ => leaves.push(s),
        }
    }
}

/// Combine signals with AND gates, joining the two shallowest first
fn build_balanced_tree(network: &mut Network, levels: &mut LevelTracker, mut lits: Vec<Signal>) -> Signal {
    while lits.len() > 1 {
        lits.sort_by_key(|s| std::cmp::Reverse(levels.level(network, s.node)));
        let (Some(a), Some(b)) = (lits.pop(), lits.pop()) else {
            break;
        };
        lits.push(network.add_and(a, b));
    }
    lits.pop().unwrap_or(Signal::TRUE)
}

impl Balance {
    /// Create a new tree balancing pass
    pub fn new() -> Self {
        Self {
            rebalanced_count: 0,
        }
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for Balance {
    fn name(&self) -> &str {
        "balance"
    }

    fn run(&mut self, network: &mut Network) -> PassResult {
        let mut result = PassResult::new(self.name());
        result.record_before(network);

        self.rebalanced_count = 0;
        let fanout = network.fanout_counts();
        let mut levels = LevelTracker::new();
        let mut rebalanced = 0;

        let balanced = rebuild(network, |new, map, id, node| {
            if !node.is_and() {
                return build_gate(new, map, node);
            }
            let mut leaves = Vec::new();
            collect_leaves(network, Signal::new(id), &fanout, &mut leaves);
            if leaves.len() <= 2 {
                return build_gate(new, map, node);
            }
            rebalanced += 1;
            let mapped = leaves.iter().map(|s| remap(map, *s)).collect();
            build_balanced_tree(new, &mut levels, mapped)
        });
        self.rebalanced_count = rebalanced;
        *network = super::dce::sweep(&balanced);

        result.record_after(network);
        result.add_extra("rebalanced", &self.rebalanced_count.to_string());
        result
    }
}
