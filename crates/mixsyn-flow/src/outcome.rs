//! Outcome Evaluator

use mixsyn_net::Network;
use serde::Serialize;
use std::time::Duration;

/// Result of comparing the assembled network with the original
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Node count or depth differs from the original
    pub changed: bool,
    /// Node count of the assembled network
    pub size: usize,
    /// Gate count of the assembled network
    pub gates: usize,
    /// Depth of the assembled network
    pub depth: u32,
    /// Latch count of the assembled network
    pub latches: usize,
    /// Gate count of the original network
    pub original_gates: usize,
    /// Depth of the original network
    pub original_depth: u32,
    /// Time spent optimizing
    pub elapsed: Duration,
}

impl Outcome {
    /// Gate count × depth
    pub fn area_delay_product(&self) -> u64 {
        self.gates as u64 * self.depth as u64
    }
}

/// Compare an assembled network against the original
pub fn evaluate(original: &Network, assembled: &Network, elapsed: Duration) -> Outcome {
    let depth = assembled.depth();
    let original_depth = original.depth();
    Outcome {
        changed: assembled.size() != original.size() || depth != original_depth,
        size: assembled.size(),
        gates: assembled.num_gates(),
        depth,
        latches: assembled.num_latches(),
        original_gates: original.num_gates(),
        original_depth,
        elapsed,
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.changed {
            return write!(f, "No change made to network");
        }
        writeln!(f, "Final ntk size = {} and depth = {}", self.gates, self.depth)?;
        writeln!(f, "Final number of latches = {}", self.latches)?;
        writeln!(f, "Area Delay Product = {}", self.area_delay_product())?;
        write!(f, "Full Optimization: {}ms", self.elapsed.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixsyn_net::Signal;

    fn chain(len: usize) -> Network {
        let mut ntk = Network::new("chain");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let mut acc = ntk.add_and(a, b);
        for i in 1..len {
            let x = if i % 2 == 0 { a } else { b.invert() };
            acc = ntk.add_and(acc, x);
        }
        ntk.add_output("y", acc);
        ntk
    }

    #[test]
    fn test_unchanged() {
        let ntk = chain(3);
        let outcome = evaluate(&ntk, &ntk.clone(), Duration::from_millis(5));
        assert!(!outcome.changed);
        assert_eq!(outcome.to_string(), "No change made to network");
    }

    #[test]
    fn test_changed_report() {
        let original = chain(4);
        let smaller = chain(2);
        let outcome = evaluate(&original, &smaller, Duration::from_millis(42));

        assert!(outcome.changed);
        assert_eq!(outcome.gates, 2);
        assert_eq!(outcome.depth, 2);
        assert_eq!(outcome.area_delay_product(), 4);
        assert_eq!(
            outcome.to_string(),
            "Final ntk size = 2 and depth = 2\n\
             Final number of latches = 0\n\
             Area Delay Product = 4\n\
             Full Optimization: 42ms"
        );
    }
}
