//! MIG Resynthesis Pass
//!
//! Converts the network to a pure majority-inverter graph (`a & b` becomes
//! `M(a, b, 0)`) and then applies Akers-style resynthesis: every gate whose
//! cut function is a majority, AND/OR, XOR, MUX or 3-input XOR is rebuilt
//! from majority gates when that frees more gates than it adds.

use super::rewrite::resynthesize;
use super::{build_gate, rebuild, remap, Pass, PassResult};
use crate::cuts::CutParams;
use crate::pipeline::Engine;
use mixsyn_net::{Network, Node, Signal};

/// MIG resynthesis pass
pub struct MigResynthesis {
    /// Cut parameters
    cut_params: CutParams,
    /// AND gates converted to majority gates
    converted_count: usize,
    /// Gates replaced by cheaper majority logic
    rewritten_count: usize,
}

impl MigResynthesis {
    /// Create a new MIG resynthesis pass
    pub fn new() -> Self {
        Self {
            cut_params: CutParams::default(),
            converted_count: 0,
            rewritten_count: 0,
        }
    }
}

impl Default for MigResynthesis {
    fn default() -> Self {
        Self::new()
    }
}

/// Express every AND gate as a majority gate with a constant input
pub(crate) fn to_mig(network: &Network) -> Network {
    rebuild(network, |new, map, _, node| match node {
        Node::And { left, right } => {
            new.add_maj(remap(map, *left), remap(map, *right), Signal::FALSE)
        }
        _ => build_gate(new, map, node),
    })
}

impl Pass for MigResynthesis {
    fn name(&self) -> &str {
        "mig_resyn"
    }

    fn run(&mut self, network: &mut Network) -> PassResult {
        let mut result = PassResult::new(self.name());
        result.record_before(network);

        self.converted_count = network.num_ands();
        let mig = if self.converted_count > 0 {
            to_mig(network)
        } else {
            network.clone()
        };

        let (resynthesized, count) = resynthesize(&mig, Engine::Mig, &self.cut_params);
        self.rewritten_count = count;
        *network = if resynthesized.num_gates() < mig.num_gates() {
            resynthesized
        } else {
            mig
        };

        result.record_after(network);
        result.add_extra("converted", &self.converted_count.to_string());
        result.add_extra("rewritten", &self.rewritten_count.to_string());
        result
    }
}
