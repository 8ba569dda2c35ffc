//! MIG Algebraic Depth Optimization
//!
//! Applies the majority associativity rule
//!
//! ```text
//! M(x, u, M(y, u, z)) = M(z, u, M(y, u, x))
//! ```
//!
//! whenever `z` arrives later than `x`, moving the critical input one level
//! closer to the output. The inner gate must be uncomplemented and have no
//! other fanout, so the rule never adds gates.
//!
//! # References
//!
//! - Amarù, L., Gaillardon, P.-E., & De Micheli, G. (2014). Majority-Inverter
//!   Graph: A novel data-structure and algorithms for efficient logic
//!   optimization.

use super::{build_gate, rebuild, remap, LevelTracker, Pass, PassResult};
use mixsyn_net::{Network, Node, Signal};

/// MIG associativity pass
pub struct MigAlgebraic {
    /// Number of associativity moves applied
    moves: usize,
}

impl MigAlgebraic {
    /// Create a new algebraic depth pass
    pub fn new() -> Self {
        Self { moves: 0 }
    }
}

impl Default for MigAlgebraic {
    fn default() -> Self {
        Self::new()
    }
}

fn lvl(levels: &mut LevelTracker, network: &Network, s: Signal) -> u32 {
    levels.level(network, s.node)
}

/// Try `M(outer[0], outer[1], inner)` with `inner = M(i0, i1, i2)`.
///
/// Returns `(x, u, y, z)` with `u` shared, `x` the other outer input and
/// `z` the deeper remaining inner input.
fn match_associativity(
    network: &Network,
    levels: &mut LevelTracker,
    outer: [Signal; 2],
    inner: [Signal; 3],
) -> Option<(Signal, Signal, Signal, Signal)> {
    for (ui, &u) in outer.iter().enumerate() {
        let x = outer[1 - ui];
        let Some(pos) = inner.iter().position(|&s| s == u) else {
            continue;
        };
        let rest: Vec<Signal> = (0..3).filter(|&i| i != pos).map(|i| inner[i]).collect();
        let (y, z) = if lvl(levels, network, rest[0]) > lvl(levels, network, rest[1]) {
            (rest[1], rest[0])
        } else {
            (rest[0], rest[1])
        };
        if lvl(levels, network, z) > lvl(levels, network, x) {
            return Some((x, u, y, z));
        }
    }
    None
}

impl Pass for MigAlgebraic {
    fn name(&self) -> &str {
        "mig_algebraic"
    }

    fn run(&mut self, network: &mut Network) -> PassResult {
        let mut result = PassResult::new(self.name());
        result.record_before(network);

        let fanout = network.fanout_counts();
        let mut levels = LevelTracker::new();
        let mut moves = 0;

        let reshaped = rebuild(network, |new, map, _, node| {
            let Node::Maj { a, b, c } = node else {
                return build_gate(new, map, node);
            };
            let old = [*a, *b, *c];
            let fanins = [remap(map, *a), remap(map, *b), remap(map, *c)];

            for k in 0..3 {
                let candidate = fanins[k];
                if old[k].inverted || fanout[old[k].node.index()] != 1 {
                    continue;
                }
                let Some(Node::Maj { a: i0, b: i1, c: i2 }) = new.node(candidate.node).cloned()
                else {
                    continue;
                };
                if candidate.inverted {
                    continue;
                }
                let outer = [fanins[(k + 1) % 3], fanins[(k + 2) % 3]];
                let Some((x, u, y, z)) =
                    match_associativity(new, &mut levels, outer, [i0, i1, i2])
                else {
                    continue;
                };

                let before = lvl(&mut levels, new, candidate)
                    .max(lvl(&mut levels, new, x))
                    .max(lvl(&mut levels, new, u))
                    + 1;
                let inner_after = lvl(&mut levels, new, y)
                    .max(lvl(&mut levels, new, u))
                    .max(lvl(&mut levels, new, x))
                    + 1;
                let after = inner_after
                    .max(lvl(&mut levels, new, z))
                    .max(lvl(&mut levels, new, u))
                    + 1;
                if after >= before {
                    continue;
                }

                moves += 1;
                let inner = new.add_maj(y, u, x);
                return new.add_maj(z, u, inner);
            }

            new.add_maj(fanins[0], fanins[1], fanins[2])
        });

        self.moves = moves;
        *network = super::dce::sweep(&reshaped);

        result.record_after(network);
        result.add_extra("moves", &self.moves.to_string());
        result
    }
}
