//! Feature Extraction for Partition Classification
//!
//! Extracts numerical features from a partition's sub-network. Features
//! capture the local structure that decides whether AND-based or
//! majority-based rewriting pays off.
//!
//! # Feature Categories
//!
//! 1. **Size Features**: Node, gate, input and output counts
//! 2. **Structure Features**: Depth, fanout distribution
//! 3. **Composition Features**: Density, majority fraction, depth ratio

use mixsyn_net::Network;
use serde::{Deserialize, Serialize};

/// Number of features in the fixed-size feature vector
pub const NUM_FEATURES: usize = 12;

/// Features extracted from a sub-network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionFeatures {
    // === Size Features ===
    /// Total number of nodes
    pub node_count: usize,
    /// Number of logic gates
    pub gate_count: usize,
    /// Number of AND gates
    pub and_count: usize,
    /// Number of majority gates
    pub maj_count: usize,
    /// Number of primary inputs (partition leaves)
    pub input_count: usize,
    /// Number of primary outputs (partition roots)
    pub output_count: usize,

    // === Structure Features ===
    /// Logic depth
    pub depth: u32,
    /// Maximum gate fanout
    pub max_fanout: u32,
    /// Average gate fanout
    pub avg_fanout: f64,
    /// Gate fanout standard deviation
    pub fanout_stddev: f64,

    // === Composition Features ===
    /// Gates per input
    pub gates_per_input: f64,
    /// Density: gates / (inputs * outputs)
    pub density: f64,
}

impl PartitionFeatures {
    /// Fraction of gates that are majority gates
    pub fn maj_fraction(&self) -> f64 {
        if self.gate_count == 0 {
            0.0
        } else {
            self.maj_count as f64 / self.gate_count as f64
        }
    }

    /// Depth relative to size (1.0 for a chain, small for wide logic)
    pub fn depth_ratio(&self) -> f64 {
        if self.gate_count == 0 {
            0.0
        } else {
            self.depth as f64 / self.gate_count as f64
        }
    }

    /// Convert to fixed-size feature vector for scoring models
    pub fn to_vector(&self) -> [f64; NUM_FEATURES] {
        let mut v = [0.0; NUM_FEATURES];

        // Normalize features to roughly [0, 1] range
        v[0] = (self.node_count as f64).ln().max(0.0) / 15.0; // log scale
        v[1] = (self.gate_count as f64).ln().max(0.0) / 15.0;
        v[2] = (self.input_count as f64).ln().max(0.0) / 10.0;
        v[3] = (self.output_count as f64).ln().max(0.0) / 10.0;

        v[4] = (self.depth as f64) / 100.0;
        v[5] = (self.max_fanout as f64) / 100.0;
        v[6] = self.avg_fanout / 10.0;
        v[7] = self.fanout_stddev / 20.0;

        v[8] = self.gates_per_input.min(100.0) / 100.0;
        v[9] = self.density.min(1.0);
        v[10] = self.maj_fraction();
        v[11] = self.depth_ratio();

        v
    }
}

/// Feature extractor for sub-networks
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a network
    pub fn extract(&self, network: &Network) -> PartitionFeatures {
        let stats = network.compute_stats();

        let fanout = network.fanout_counts();
        let gate_fanouts: Vec<f64> = network
            .iter_gates()
            .map(|(id, _)| fanout[id.index()] as f64)
            .collect();

        let gates_per_input = if stats.inputs > 0 {
            stats.gates as f64 / stats.inputs as f64
        } else {
            0.0
        };

        let density = if stats.inputs > 0 && stats.outputs > 0 {
            stats.gates as f64 / (stats.inputs * stats.outputs) as f64
        } else {
            0.0
        };

        PartitionFeatures {
            node_count: stats.size,
            gate_count: stats.gates,
            and_count: stats.ands,
            maj_count: stats.majs,
            input_count: stats.inputs,
            output_count: stats.outputs,
            depth: stats.depth,
            max_fanout: stats.max_fanout,
            avg_fanout: stats.avg_fanout,
            fanout_stddev: stddev(&gate_fanouts),
            gates_per_input,
            density,
        }
    }
}

fn stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Convenience function to extract features
pub fn extract_features(network: &Network) -> PartitionFeatures {
    FeatureExtractor::new().extract(network)
}
