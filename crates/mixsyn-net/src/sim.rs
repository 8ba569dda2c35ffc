//! Bit-parallel simulation
//!
//! Every signal carries 64 patterns in one `u64`. Latch outputs are treated
//! as free variables alongside the primary inputs, so two networks with the
//! same interface agree on all words iff their combinational logic and
//! next-state functions agree on those patterns.

use crate::error::{NetError, NetResult};
use crate::network::{Network, Node, Signal};

/// Simulation values for one 64-pattern word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimWords {
    /// One word per primary output, in port order
    pub outputs: Vec<u64>,
    /// One word per latch next-state input, in latch order
    pub next_state: Vec<u64>,
}

/// Simulate 64 patterns at once.
///
/// `inputs` holds one word per primary input and `state` one word per latch.
pub fn simulate(network: &Network, inputs: &[u64], state: &[u64]) -> NetResult<SimWords> {
    if inputs.len() != network.num_inputs() || state.len() != network.num_latches() {
        return Err(NetError::Malformed(format!(
            "simulation expects {} input and {} state words, got {} and {}",
            network.num_inputs(),
            network.num_latches(),
            inputs.len(),
            state.len()
        )));
    }

    let mut values = vec![0u64; network.size()];
    let mut next_input = inputs.iter();
    let mut next_latch = state.iter();
    let value = |values: &[u64], s: Signal| {
        let v = values[s.node.index()];
        if s.inverted {
            !v
        } else {
            v
        }
    };

    for (id, node) in network.iter_nodes() {
        values[id.index()] = match node {
            Node::Const => 0,
            Node::Input { .. } => next_input.next().copied().unwrap_or(0),
            Node::Latch { .. } => next_latch.next().copied().unwrap_or(0),
            Node::And { left, right } => value(&values, *left) & value(&values, *right),
            Node::Maj { a, b, c } => {
                let (a, b, c) = (value(&values, *a), value(&values, *b), value(&values, *c));
                (a & b) | (a & c) | (b & c)
            }
        };
    }

    let outputs = network
        .outputs()
        .iter()
        .map(|(_, s)| value(&values, *s))
        .collect();
    let next_state = network
        .latches()
        .iter()
        .map(|(_, _, data, _)| value(&values, *data))
        .collect();

    Ok(SimWords {
        outputs,
        next_state,
    })
}

/// Deterministic pseudo-random words (xorshift)
pub fn random_words(count: usize, seed: u64) -> Vec<u64> {
    let mut state = seed.max(1);
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        })
        .collect()
}

/// Compare two networks with the same interface on `rounds` × 64 random
/// patterns
pub fn equivalent(a: &Network, b: &Network, rounds: usize) -> NetResult<bool> {
    if a.num_inputs() != b.num_inputs()
        || a.num_outputs() != b.num_outputs()
        || a.num_latches() != b.num_latches()
    {
        return Ok(false);
    }

    let width = a.num_inputs() + a.num_latches();
    for round in 0..rounds {
        let words = random_words(width, 0xDEAD_BEEF ^ (round as u64).wrapping_mul(0x9E37_79B9));
        let (inputs, state) = words.split_at(a.num_inputs());
        if simulate(a, inputs, state)? != simulate(b, inputs, state)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_and_maj() {
        let mut ntk = Network::new("test");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let c = Signal::new(ntk.add_input("c"));
        let ab = ntk.add_and(a, b.invert());
        let m = ntk.add_maj(a, b, c);
        ntk.add_output("ab", ab);
        ntk.add_output("m", m);

        let words = simulate(&ntk, &[0b1100, 0b1010, 0b0110], &[]).unwrap();
        assert_eq!(words.outputs[0] & 0xF, 0b0100);
        assert_eq!(words.outputs[1] & 0xF, 0b1110);
    }

    #[test]
    fn test_simulate_next_state() {
        let mut ntk = Network::new("toggle");
        let q = ntk.add_latch("q", Some(false));
        ntk.set_latch_data(q, Signal::not(q)).unwrap();

        let words = simulate(&ntk, &[], &[0b01]).unwrap();
        assert_eq!(words.next_state[0] & 0b11, 0b10);
    }

    #[test]
    fn test_equivalent_xor_forms() {
        let mut x1 = Network::new("x1");
        let a = Signal::new(x1.add_input("a"));
        let b = Signal::new(x1.add_input("b"));
        let y = x1.add_xor(a, b);
        x1.add_output("y", y);

        let mut x2 = Network::new("x2");
        let a = Signal::new(x2.add_input("a"));
        let b = Signal::new(x2.add_input("b"));
        let or = x2.add_or(a, b);
        let nand = x2.add_and(a, b).invert();
        let y = x2.add_and(or, nand);
        x2.add_output("y", y);

        assert!(equivalent(&x1, &x2, 4).unwrap());

        let mut x3 = Network::new("x3");
        let a = Signal::new(x3.add_input("a"));
        let b = Signal::new(x3.add_input("b"));
        let y = x3.add_or(a, b);
        x3.add_output("y", y);
        assert!(!equivalent(&x1, &x3, 4).unwrap());
    }

    #[test]
    fn test_simulate_rejects_wrong_width() {
        let mut ntk = Network::new("test");
        ntk.add_input("a");
        assert!(simulate(&ntk, &[], &[]).is_err());
    }
}
