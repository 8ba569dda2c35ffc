//! Optimization Pipelines
//!
//! A pipeline is a fixed pass script run on a copy of a network until it
//! converges. There are two engines: the AIG pipeline (cut rewriting with
//! direct and XOR-aware resynthesis, balancing, cleanup) and the MIG
//! pipeline (majority resynthesis, algebraic depth rewriting, cleanup). The
//! objective tunes the script toward area, depth or a balance of both.
//!
//! Every pipeline is a pure function of its input network.
//!
//! # Example
//!
//! ```ignore
//! use mixsyn_synth::{AigPipeline, Objective, Pipeline};
//!
//! let optimized = AigPipeline::new(Objective::Area).run(&network);
//! ```

use crate::passes::{
    AigDecompose, AigRewrite, Balance, Dce, MigAlgebraic, MigResynthesis, Pass, PassResult,
    Strash,
};
use mixsyn_net::Network;
use serde::{Deserialize, Serialize};

/// Representation an optimization pipeline works in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// AND-inverter graph
    Aig,
    /// Majority-inverter graph
    Mig,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Aig => write!(f, "AIG"),
            Engine::Mig => write!(f, "MIG"),
        }
    }
}

/// What a pipeline optimizes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// Trade off gate count and depth
    #[default]
    Balanced,
    /// Minimize gate count
    Area,
    /// Minimize depth
    Depth,
}

/// Default iteration bound for pass scripts
pub const DEFAULT_MAX_ITERATIONS: usize = 3;

/// An optimization pipeline
pub trait Pipeline: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> String {
        format!("{}-{:?}", self.engine(), self.objective()).to_lowercase()
    }

    /// Representation the pipeline works in
    fn engine(&self) -> Engine;

    /// What the pipeline optimizes for
    fn objective(&self) -> Objective;

    /// Optimize a copy of `network`
    fn run(&self, network: &Network) -> Network;
}

/// Run a single pass by name
fn run_pass(network: &mut Network, pass_name: &str) -> Option<PassResult> {
    match pass_name {
        "strash" => Some(Strash::new().run(network)),
        "dce" => Some(Dce::new().run(network)),
        "balance" => Some(Balance::new().run(network)),
        "rewrite" => Some(AigRewrite::new().run(network)),
        "aig_decompose" => Some(AigDecompose::new().run(network)),
        "mig_resyn" => Some(MigResynthesis::new().run(network)),
        "mig_algebraic" => Some(MigAlgebraic::new().run(network)),
        _ => {
            tracing::warn!("Unknown pass '{}', skipping", pass_name);
            None
        }
    }
}

/// Run a pass script until gate count and depth stop changing
fn run_script(network: &Network, passes: &[&str], max_iterations: usize) -> Network {
    let mut current = network.clone();

    for iteration in 0..max_iterations {
        let gates_before = current.num_gates();
        let depth_before = current.depth();

        for pass_name in passes {
            if let Some(result) = run_pass(&mut current, pass_name) {
                tracing::trace!("[PASS] {}", result);
            }
        }

        if current.num_gates() == gates_before && current.depth() == depth_before {
            tracing::trace!("Converged after {} iterations", iteration + 1);
            break;
        }
    }

    current
}

/// AIG optimization pipeline
#[derive(Debug, Clone)]
pub struct AigPipeline {
    objective: Objective,
    max_iterations: usize,
}

impl AigPipeline {
    /// Create an AIG pipeline for the given objective
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the iteration bound
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Get the pass sequence for the current objective
    pub fn pass_sequence(&self) -> Vec<&'static str> {
        match self.objective {
            Objective::Balanced => vec![
                "aig_decompose",
                "strash",
                "rewrite",
                "balance",
                "rewrite",
                "dce",
            ],
            Objective::Area => vec!["aig_decompose", "strash", "rewrite", "rewrite", "dce"],
            Objective::Depth => vec![
                "aig_decompose",
                "strash",
                "balance",
                "rewrite",
                "balance",
                "dce",
            ],
        }
    }
}

impl Pipeline for AigPipeline {
    fn engine(&self) -> Engine {
        Engine::Aig
    }

    fn objective(&self) -> Objective {
        self.objective
    }

    fn run(&self, network: &Network) -> Network {
        run_script(network, &self.pass_sequence(), self.max_iterations)
    }
}

/// MIG optimization pipeline
#[derive(Debug, Clone)]
pub struct MigPipeline {
    objective: Objective,
    max_iterations: usize,
}

impl MigPipeline {
    /// Create a MIG pipeline for the given objective
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the iteration bound
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Get the pass sequence for the current objective
    pub fn pass_sequence(&self) -> Vec<&'static str> {
        match self.objective {
            Objective::Balanced => vec!["strash", "mig_resyn", "mig_algebraic", "dce"],
            Objective::Area => vec!["strash", "mig_resyn", "mig_resyn", "dce"],
            Objective::Depth => vec![
                "strash",
                "mig_resyn",
                "mig_algebraic",
                "mig_algebraic",
                "dce",
            ],
        }
    }
}

impl Pipeline for MigPipeline {
    fn engine(&self) -> Engine {
        Engine::Mig
    }

    fn objective(&self) -> Objective {
        self.objective
    }

    fn run(&self, network: &Network) -> Network {
        run_script(network, &self.pass_sequence(), self.max_iterations)
    }
}

/// Build the pipeline for an engine and objective
pub fn pipeline_for(engine: Engine, objective: Objective) -> Box<dyn Pipeline> {
    match engine {
        Engine::Aig => Box::new(AigPipeline::new(objective)),
        Engine::Mig => Box::new(MigPipeline::new(objective)),
    }
}
