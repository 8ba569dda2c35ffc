//! Network Optimization Passes
//!
//! Passes transform a network in place to reduce gate count or depth while
//! preserving its function.
//!
//! # Pass Categories
//!
//! - **Structural**: `strash`, `dce` - Clean up the network structure
//! - **Balancing**: `balance` - Reduce AND-tree depth
//! - **Rewriting**: `rewrite` - Replace AIG cuts with smaller equivalents
//! - **Conversion**: `aig_decompose` - Express majority gates as ANDs
//! - **MIG**: `mig_resyn`, `mig_algebraic` - Majority resynthesis and
//!   associativity-based depth reduction
//!
//! # Example
//!
//! ```ignore
//! use mixsyn_synth::passes::{Pass, Strash, AigRewrite, Dce};
//!
//! Strash::new().run(&mut network);
//! AigRewrite::new().run(&mut network);
//! Dce::new().run(&mut network);
//! ```

mod aig_decompose;
mod balance;
mod dce;
mod mig_algebraic;
mod mig_resyn;
mod rewrite;
mod strash;

pub use aig_decompose::AigDecompose;
pub use balance::Balance;
pub use dce::Dce;
pub use mig_algebraic::MigAlgebraic;
pub use mig_resyn::MigResynthesis;
pub use rewrite::AigRewrite;
pub use strash::Strash;

use mixsyn_net::{Network, Node, NodeId, Signal};

/// Result of running an optimization pass
#[derive(Debug, Clone, Default)]
pub struct PassResult {
    /// Name of the pass
    pub pass_name: String,
    /// Number of nodes before the pass
    pub nodes_before: usize,
    /// Number of nodes after the pass
    pub nodes_after: usize,
    /// Number of gates before
    pub gates_before: usize,
    /// Number of gates after
    pub gates_after: usize,
    /// Depth before
    pub levels_before: u32,
    /// Depth after
    pub levels_after: u32,
    /// Whether the pass made any changes
    pub changed: bool,
    /// Additional statistics
    pub extra: Vec<(String, String)>,
}

impl PassResult {
    /// Create a new pass result
    pub fn new(pass_name: &str) -> Self {
        Self {
            pass_name: pass_name.to_string(),
            ..Default::default()
        }
    }

    /// Record the "before" stats
    pub fn record_before(&mut self, network: &Network) {
        self.nodes_before = network.size();
        self.gates_before = network.num_gates();
        self.levels_before = network.depth();
    }

    /// Record the "after" stats
    pub fn record_after(&mut self, network: &Network) {
        self.nodes_after = network.size();
        self.gates_after = network.num_gates();
        self.levels_after = network.depth();
        self.changed = self.nodes_before != self.nodes_after
            || self.gates_before != self.gates_after
            || self.levels_before != self.levels_after;
    }

    /// Add extra information
    pub fn add_extra(&mut self, key: &str, value: &str) {
        self.extra.push((key.to_string(), value.to_string()));
    }

    /// Get reduction in gates
    pub fn gate_reduction(&self) -> i64 {
        self.gates_before as i64 - self.gates_after as i64
    }

    /// Get reduction in levels
    pub fn level_reduction(&self) -> i64 {
        self.levels_before as i64 - self.levels_after as i64
    }
}

fn signed(reduction: i64) -> String {
    if reduction >= 0 {
        format!("-{}", reduction)
    } else {
        format!("+{}", -reduction)
    }
}

impl std::fmt::Display for PassResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: gates {} → {} ({}), levels {} → {} ({})",
            self.pass_name,
            self.gates_before,
            self.gates_after,
            signed(self.gate_reduction()),
            self.levels_before,
            self.levels_after,
            signed(self.level_reduction())
        )
    }
}

/// Trait for network optimization passes
pub trait Pass {
    /// Get the name of this pass
    fn name(&self) -> &str;

    /// Run the pass on a network
    fn run(&mut self, network: &mut Network) -> PassResult;
}

/// Map an old signal through an old → new node mapping
pub(crate) fn remap(map: &[Signal], s: Signal) -> Signal {
    map[s.node.index()].invert_if(s.inverted)
}

/// Copy a gate with structural hashing, remapping its fanins
pub(crate) fn build_gate(network: &mut Network, map: &[Signal], node: &Node) -> Signal {
    match node {
        Node::And { left, right } => network.add_and(remap(map, *left), remap(map, *right)),
        Node::Maj { a, b, c } => {
            network.add_maj(remap(map, *a), remap(map, *b), remap(map, *c))
        }
        _ => Signal::FALSE,
    }
}

/// Rebuild a network node by node.
///
/// Inputs and latches are recreated in order (latches with placeholder
/// data, which is set once every gate exists). `gate` produces the new
/// signal for each old gate given the mapping built so far.
pub(crate) fn rebuild<F>(old: &Network, mut gate: F) -> Network
where
    F: FnMut(&mut Network, &[Signal], NodeId, &Node) -> Signal,
{
    let mut new = Network::new(old.name.clone());
    let mut map = vec![Signal::FALSE; old.size()];

    for (id, node) in old.iter_nodes() {
        map[id.index()] = match node {
            Node::Const => Signal::FALSE,
            Node::Input { name } => Signal::new(new.add_input(name.clone())),
            Node::Latch { name, init, .. } => Signal::new(new.add_latch(name.clone(), *init)),
            Node::And { .. } | Node::Maj { .. } => gate(&mut new, &map, id, node),
        };
    }

    for (name, s) in old.outputs() {
        new.add_output(name.clone(), remap(&map, *s));
    }
    for (id, name, data, _) in old.latches() {
        if let Err(e) = new.set_latch_data(map[id.index()].node, remap(&map, data)) {
            tracing::error!("Lost next-state input of latch '{}': {}", name, e);
        }
    }

    new
}

/// Logic levels of a network that is still growing
pub(crate) struct LevelTracker {
    levels: Vec<u32>,
}

impl LevelTracker {
    pub(crate) fn new() -> Self {
        Self { levels: Vec::new() }
    }

    /// Level of a node, computing levels of nodes added since the last call
    pub(crate) fn level(&mut self, network: &Network, node: NodeId) -> u32 {
        while self.levels.len() < network.size() {
            let id = NodeId(self.levels.len() as u32);
            let level = match network.node(id) {
                Some(n) if n.is_gate() => {
                    n.fanins()
                        .iter()
                        .map(|s| self.levels[s.node.index()])
                        .max()
                        .unwrap_or(0)
                        + 1
                }
                _ => 0,
            };
            self.levels.push(level);
        }
        self.levels.get(node.index()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_result_display() {
        let mut result = PassResult::new("test");
        result.gates_before = 10;
        result.gates_after = 7;
        result.levels_before = 4;
        result.levels_after = 5;
        assert_eq!(result.to_string(), "test: gates 10 → 7 (-3), levels 4 → 5 (+1)");
    }

    #[test]
    fn test_rebuild_preserves_interface() {
        let mut ntk = Network::new("seq");
        let a = Signal::new(ntk.add_input("a"));
        let q = ntk.add_latch("q", Some(true));
        let b = Signal::new(ntk.add_input("b"));
        let x = ntk.add_and(a, Signal::new(q));
        let y = ntk.add_maj(x, b, a.invert());
        ntk.set_latch_data(q, y.invert()).unwrap();
        ntk.add_output("y", y);

        let copy = rebuild(&ntk, |new, map, _, node| build_gate(new, map, node));
        assert_eq!(copy, ntk);
    }

    #[test]
    fn test_level_tracker_follows_growth() {
        let mut ntk = Network::new("t");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let mut levels = LevelTracker::new();
        assert_eq!(levels.level(&ntk, a.node), 0);

        let ab = ntk.add_and(a, b);
        let abc = ntk.add_or(ab, a.invert());
        assert_eq!(levels.level(&ntk, abc.node), 2);
        assert_eq!(levels.level(&ntk, ab.node), 1);
    }
}
