//! Majority Decomposition Pass
//!
//! Expresses every majority gate as AND gates, `M(a, b, c) = ab | c(a | b)`,
//! so that AIG-only passes see the whole network.

use super::{build_gate, rebuild, remap, Pass, PassResult};
use crate::pipeline::Engine;
use crate::resyn::majority;
use mixsyn_net::{Network, Node};

/// Majority-to-AND decomposition pass
pub struct AigDecompose {
    /// Number of majority gates decomposed
    decomposed_count: usize,
}

impl AigDecompose {
    /// Create a new decomposition pass
    pub fn new() -> Self {
        Self {
            decomposed_count: 0,
        }
    }
}

impl Default for AigDecompose {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for AigDecompose {
    fn name(&self) -> &str {
        "aig_decompose"
    }

    fn run(&mut self, network: &mut Network) -> PassResult {
        let mut result = PassResult::new(self.name());
        result.record_before(network);

        self.decomposed_count = network.num_majs();
        if self.decomposed_count > 0 {
            *network = rebuild(network, |new, map, _, node| match node {
                Node::Maj { a, b, c } => majority(
                    new,
                    remap(map, *a),
                    remap(map, *b),
                    remap(map, *c),
                    Engine::Aig,
                ),
                _ => build_gate(new, map, node),
            });
        }

        result.record_after(network);
        result.add_extra("decomposed", &self.decomposed_count.to_string());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixsyn_net::sim::equivalent;
    use mixsyn_net::Signal;

    #[test]
    fn test_decompose_majority() {
        let mut ntk = Network::new("test");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let c = Signal::new(ntk.add_input("c"));
        let m = ntk.add_maj(a, b.invert(), c);
        ntk.add_output("m", m);
        let original = ntk.clone();

        AigDecompose::new().run(&mut ntk);
        assert_eq!(ntk.num_majs(), 0);
        assert_eq!(ntk.num_ands(), 4);
        assert!(equivalent(&original, &ntk, 2).unwrap());
    }

    #[test]
    fn test_decompose_constant_majority_is_and() {
        let mut ntk = Network::new("test");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let m = ntk.add_maj(a, b, Signal::FALSE);
        ntk.add_output("m", m);

        AigDecompose::new().run(&mut ntk);
        assert_eq!(ntk.num_ands(), 1);
    }
}
