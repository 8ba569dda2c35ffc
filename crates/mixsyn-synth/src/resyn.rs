//! Small-function resynthesis
//!
//! Cut functions of up to four variables are matched against a fixed set of
//! templates (constants, literals, AND trees, XOR, MUX, majority, 3-input
//! XOR) in every input and output polarity. Each template knows its gate
//! cost and how to build itself in AIG or MIG form.

use crate::cuts::VAR_MASKS;
use crate::pipeline::Engine;
use mixsyn_net::{Network, Signal};

/// A cut variable with polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lit {
    /// Index of the cut leaf
    pub var: usize,
    /// Whether the leaf is complemented
    pub inverted: bool,
}

impl Lit {
    fn new(var: usize, inverted: bool) -> Self {
        Self { var, inverted }
    }

    fn truth(self) -> u16 {
        let t = VAR_MASKS[self.var];
        if self.inverted {
            !t
        } else {
            t
        }
    }

    fn signal(self, leaves: &[Signal]) -> Signal {
        leaves[self.var].invert_if(self.inverted)
    }
}

/// A resynthesis template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    /// Constant function
    Const(bool),
    /// A single (possibly complemented) leaf
    Literal(Lit),
    /// AND of literals, optionally complemented (covers OR)
    And { lits: Vec<Lit>, inverted: bool },
    /// Two-input XOR, optionally complemented
    Xor { a: Lit, b: Lit, inverted: bool },
    /// `sel ? then : else`, optionally complemented
    Mux {
        sel: Lit,
        then_lit: Lit,
        else_lit: Lit,
        inverted: bool,
    },
    /// Three-input majority
    Maj { a: Lit, b: Lit, c: Lit },
    /// Three-input XOR, optionally complemented
    Xor3 { a: Lit, b: Lit, c: Lit, inverted: bool },
}

fn maj(a: u16, b: u16, c: u16) -> u16 {
    (a & b) | (a & c) | (b & c)
}

fn invert_if(t: u16, cond: bool) -> u16 {
    if cond {
        !t
    } else {
        t
    }
}

/// Variables a 4-input truth table depends on
pub fn support(truth: u16) -> Vec<usize> {
    (0..VAR_MASKS.len())
        .filter(|&var| {
            let mask = VAR_MASKS[var];
            let shift = 1u32 << var;
            ((truth & mask) >> shift) != (truth & !mask)
        })
        .collect()
}

impl Template {
    /// Function of the template over the cut variables
    pub fn truth(&self) -> u16 {
        match self {
            Template::Const(v) => invert_if(0, *v),
            Template::Literal(l) => l.truth(),
            Template::And { lits, inverted } => {
                invert_if(lits.iter().fold(0xFFFF, |acc, l| acc & l.truth()), *inverted)
            }
            Template::Xor { a, b, inverted } => invert_if(a.truth() ^ b.truth(), *inverted),
            Template::Mux {
                sel,
                then_lit,
                else_lit,
                inverted,
            } => invert_if(
                (sel.truth() & then_lit.truth()) | (!sel.truth() & else_lit.truth()),
                *inverted,
            ),
            Template::Maj { a, b, c } => maj(a.truth(), b.truth(), c.truth()),
            Template::Xor3 { a, b, c, inverted } => {
                invert_if(a.truth() ^ b.truth() ^ c.truth(), *inverted)
            }
        }
    }

    /// Find a template implementing `truth`
    pub fn find(truth: u16) -> Option<Template> {
        let vars = support(truth);
        candidates(&vars).into_iter().find(|t| t.truth() == truth)
    }

    /// Upper bound on the number of gates the template builds
    pub fn cost(&self, engine: Engine) -> usize {
        match (self, engine) {
            (Template::Const(_), _) | (Template::Literal(_), _) => 0,
            (Template::And { lits, .. }, _) => lits.len().saturating_sub(1),
            (Template::Xor { .. }, _) | (Template::Mux { .. }, _) => 3,
            (Template::Maj { .. }, Engine::Aig) => 4,
            (Template::Maj { .. }, Engine::Mig) => 1,
            (Template::Xor3 { .. }, Engine::Aig) => 6,
            (Template::Xor3 { .. }, Engine::Mig) => 3,
        }
    }

    /// Instantiate the template over `leaves`
    pub fn build(&self, network: &mut Network, leaves: &[Signal], engine: Engine) -> Signal {
        match self {
            Template::Const(v) => Signal::FALSE.invert_if(*v),
            Template::Literal(l) => l.signal(leaves),
            Template::And { lits, inverted } => {
                let signals: Vec<Signal> = lits.iter().map(|l| l.signal(leaves)).collect();
                and_tree(network, signals, engine).invert_if(*inverted)
            }
            Template::Xor { a, b, inverted } => {
                let (a, b) = (a.signal(leaves), b.signal(leaves));
                xor(network, a, b, engine).invert_if(*inverted)
            }
            Template::Mux {
                sel,
                then_lit,
                else_lit,
                inverted,
            } => {
                let (s, t, e) = (
                    sel.signal(leaves),
                    then_lit.signal(leaves),
                    else_lit.signal(leaves),
                );
                let out = match engine {
                    Engine::Aig => network.add_mux(s, t, e),
                    Engine::Mig => {
                        let st = network.add_maj(s, t, Signal::FALSE);
                        let se = network.add_maj(s.invert(), e, Signal::FALSE);
                        network.add_maj(st, se, Signal::TRUE)
                    }
                };
                out.invert_if(*inverted)
            }
            Template::Maj { a, b, c } => {
                let (a, b, c) = (a.signal(leaves), b.signal(leaves), c.signal(leaves));
                majority(network, a, b, c, engine)
            }
            Template::Xor3 { a, b, c, inverted } => {
                let (a, b, c) = (a.signal(leaves), b.signal(leaves), c.signal(leaves));
                let out = match engine {
                    Engine::Aig => {
                        let ab = network.add_xor(a, b);
                        network.add_xor(ab, c)
                    }
                    Engine::Mig => {
                        let m = network.add_maj(a, b, c);
                        let n = network.add_maj(a, b, c.invert());
                        network.add_maj(m.invert(), n, c)
                    }
                };
                out.invert_if(*inverted)
            }
        }
    }
}

/// Majority of three signals in the chosen representation
pub fn majority(network: &mut Network, a: Signal, b: Signal, c: Signal, engine: Engine) -> Signal {
    match engine {
        Engine::Mig => network.add_maj(a, b, c),
        Engine::Aig => {
            // ab | c(a | b)
            let ab = network.add_and(a, b);
            let a_or_b = network.add_or(a, b);
            let rest = network.add_and(c, a_or_b);
            network.add_or(ab, rest)
        }
    }
}

fn and2(network: &mut Network, a: Signal, b: Signal, engine: Engine) -> Signal {
    match engine {
        Engine::Aig => network.add_and(a, b),
        Engine::Mig => network.add_maj(a, b, Signal::FALSE),
    }
}

fn xor(network: &mut Network, a: Signal, b: Signal, engine: Engine) -> Signal {
    match engine {
        Engine::Aig => network.add_xor(a, b),
        Engine::Mig => {
            let or = network.add_maj(a, b, Signal::TRUE);
            let and = network.add_maj(a, b, Signal::FALSE);
            network.add_maj(or, and.invert(), Signal::FALSE)
        }
    }
}

/// Balanced AND tree
fn and_tree(network: &mut Network, mut signals: Vec<Signal>, engine: Engine) -> Signal {
    if signals.is_empty() {
        return Signal::TRUE;
    }
    while signals.len() > 1 {
        let mut next = Vec::with_capacity(signals.len().div_ceil(2));
        for pair in signals.chunks(2) {
            match pair {
                [a, b] => next.push(and2(network, *a, *b, engine)),
                [a] => next.push(*a),
                _ => {}
            }
        }
        signals = next;
    }
    signals[0]
}

fn polarities(vars: &[usize], mask: usize) -> Vec<Lit> {
    vars.iter()
        .enumerate()
        .map(|(i, &v)| Lit::new(v, mask & (1 << i) != 0))
        .collect()
}

fn candidates(vars: &[usize]) -> Vec<Template> {
    let mut out = Vec::new();
    match vars {
        [] => {
            out.push(Template::Const(false));
            out.push(Template::Const(true));
        }
        [v] => {
            out.push(Template::Literal(Lit::new(*v, false)));
            out.push(Template::Literal(Lit::new(*v, true)));
        }
        _ => {}
    }

    if vars.len() >= 2 {
        for mask in 0..(1usize << vars.len()) {
            for inverted in [false, true] {
                out.push(Template::And {
                    lits: polarities(vars, mask),
                    inverted,
                });
            }
        }
    }

    if let [a, b] = vars {
        for inverted in [false, true] {
            out.push(Template::Xor {
                a: Lit::new(*a, false),
                b: Lit::new(*b, false),
                inverted,
            });
        }
    }

    if let [a, b, c] = vars {
        for mask in 0..8usize {
            if let [x, y, z] = polarities(vars, mask)[..] {
                out.push(Template::Maj { a: x, b: y, c: z });
            }
        }
        for (s, t, e) in [(*a, *b, *c), (*b, *a, *c), (*c, *a, *b)] {
            for mask in 0..4usize {
                for inverted in [false, true] {
                    out.push(Template::Mux {
                        sel: Lit::new(s, false),
                        then_lit: Lit::new(t, mask & 1 != 0),
                        else_lit: Lit::new(e, mask & 2 != 0),
                        inverted,
                    });
                    out.push(Template::Mux {
                        sel: Lit::new(s, false),
                        then_lit: Lit::new(e, mask & 1 != 0),
                        else_lit: Lit::new(t, mask & 2 != 0),
                        inverted,
                    });
                }
            }
        }
        for inverted in [false, true] {
            out.push(Template::Xor3 {
                a: Lit::new(*a, false),
                b: Lit::new(*b, false),
                c: Lit::new(*c, false),
                inverted,
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixsyn_net::sim::simulate;

    const A: u16 = VAR_MASKS[0];
    const B: u16 = VAR_MASKS[1];
    const C: u16 = VAR_MASKS[2];

    #[test]
    fn test_support() {
        assert_eq!(support(A & B), vec![0, 1]);
        assert_eq!(support(C), vec![2]);
        assert!(support(0xFFFF).is_empty());
        assert_eq!(support(A ^ B ^ C), vec![0, 1, 2]);
    }

    #[test]
    fn test_find_templates() {
        assert_eq!(Template::find(0), Some(Template::Const(false)));
        assert!(matches!(Template::find(!B), Some(Template::Literal(l)) if l.var == 1 && l.inverted));
        assert!(matches!(Template::find(A | !C), Some(Template::And { inverted: true, .. })));
        assert!(matches!(Template::find(!(A ^ B)), Some(Template::Xor { inverted: true, .. })));
        assert!(matches!(Template::find(maj(A, !B, C)), Some(Template::Maj { .. })));
        assert!(matches!(Template::find((A & B) | (!A & C)), Some(Template::Mux { .. })));
        assert!(matches!(Template::find(A ^ B ^ C), Some(Template::Xor3 { .. })));
        // 2-level function without a template
        assert_eq!(Template::find((A & B) | (C & VAR_MASKS[3])), None);
    }

    /// Every template must build the function it claims, in both engines
    #[test]
    fn test_build_matches_truth() {
        let functions = [
            A & !B,
            !(A & B & C),
            A ^ C,
            (A & B) | (!A & C),
            maj(!A, B, C),
            !(A ^ B ^ C),
        ];
        for engine in [Engine::Aig, Engine::Mig] {
            for &tt in &functions {
                let template = Template::find(tt).unwrap();
                let mut ntk = Network::new("t");
                let leaves: Vec<Signal> = (0..3)
                    .map(|i| Signal::new(ntk.add_input(format!("x{}", i))))
                    .collect();
                let out = template.build(&mut ntk, &leaves, engine);
                ntk.add_output("y", out);
                assert!(ntk.num_gates() <= template.cost(engine));

                let words = simulate(&ntk, &[A as u64, B as u64, C as u64], &[]).unwrap();
                assert_eq!(words.outputs[0] as u16, tt, "{:?} via {:?}", template, engine);
            }
        }
    }
}
