//! Dead Code Elimination Pass
//!
//! Removes gates that do not reach any primary output or latch next-state
//! input. Primary inputs and latches are always kept so the interface of
//! the network never changes.

use super::{build_gate, rebuild, Pass, PassResult};
use mixsyn_net::{Network, Signal};

/// Dead code elimination pass
pub struct Dce {
    /// Number of gates removed
    removed_count: usize,
}

/// Mark the fanin cones of all sinks as live
fn mark_live(network: &Network) -> Vec<bool> {
    let mut live = vec![false; network.size()];
    live[0] = true;

    let mut stack: Vec<_> = network.sinks().map(|s| s.node).collect();
    while let Some(node_id) = stack.pop() {
        if live[node_id.index()] {
            continue;
        }
        live[node_id.index()] = true;
        if let Some(node) = network.node(node_id) {
            stack.extend(node.fanins().iter().map(|s| s.node));
        }
    }
    live
}

/// Rebuild a network keeping only live logic
pub(crate) fn sweep(network: &Network) -> Network {
    let live = mark_live(network);
    rebuild(network, |new, map, id, node| {
        if live[id.index()] {
            build_gate(new, map, node)
        } else {
            Signal::FALSE
        }
    })
}

impl Dce {
    /// Create a new DCE pass
    pub fn new() -> Self {
        Self { removed_count: 0 }
    }
}

impl Default for Dce {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for Dce {
    fn name(&self) -> &str {
        "dce"
    }

    fn run(&mut self, network: &mut Network) -> PassResult {
        let mut result = PassResult::new(self.name());
        result.record_before(network);

        let live = mark_live(network);
        self.removed_count = network
            .iter_gates()
            .filter(|(id, _)| !live[id.index()])
            .count();

        if self.removed_count > 0 {
            *network = sweep(network);
        }

        result.record_after(network);
        result.add_extra("removed", &self.removed_count.to_string());
        result
    }
}
