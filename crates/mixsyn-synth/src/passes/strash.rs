//! Structural Hashing Pass
//!
//! Rebuilds the network with structural hashing, merging structurally
//! identical gates and applying the trivial AND/majority simplifications.
//!
//! # References
//!
//! - ABC User Guide: `strash` command for structural hashing.

use super::{build_gate, rebuild, Pass, PassResult};
use mixsyn_net::Network;

/// Structural hashing pass
pub struct Strash {
    /// Number of gates merged or simplified away
    merged_count: usize,
}

impl Strash {
    /// Create a new structural hashing pass
    pub fn new() -> Self {
        Self { merged_count: 0 }
    }
}

impl Default for Strash {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for Strash {
    fn name(&self) -> &str {
        "strash"
    }

    fn run(&mut self, network: &mut Network) -> PassResult {
        let mut result = PassResult::new(self.name());
        result.record_before(network);

        let hashed = rebuild(network, |new, map, _, node| build_gate(new, map, node));
        let swept = super::dce::sweep(&hashed);
        self.merged_count = network.num_gates().saturating_sub(swept.num_gates());
        *network = swept;

        result.record_after(network);
        result.add_extra("merged", &self.merged_count.to_string());
        result
    }
}
