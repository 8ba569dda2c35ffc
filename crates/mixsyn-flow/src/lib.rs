//! Mixed AIG/MIG Synthesis Flow
//!
//! Optimizes a partitioned network by choosing, per partition, the engine
//! that suits it best:
//!
//! ```text
//! PartitionView ─► classify + resolve ─► combine ─► dispatch ─► assemble ─► evaluate
//!                  (mixsyn-ml, forced)   (union-   (rayon,     (one new     (Outcome)
//!                                         find)     pipelines)  network)
//! ```
//!
//! Configuration and precondition errors stop a run before any pipeline
//! work. A group whose pipeline does not improve it keeps its original
//! logic; that only shows in the final [`Outcome`].
//!
//! # Example
//!
//! ```ignore
//! use mixsyn_flow::{MixedSynthesis, RunConfig, Session};
//!
//! let session = Session::load("design.json")?;
//! let config = RunConfig::builder().strategy(0).combine(true).build()?;
//! let report = MixedSynthesis::new().run(&session, &config)?;
//! println!("{}", report.outcome);
//! ```

pub mod assemble;
pub mod combiner;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod outcome;
pub mod output;
pub mod resolver;
pub mod session;

pub use assemble::assemble;
pub use combiner::{combine, Group};
pub use config::{ForcedPartitions, RunConfig, RunConfigBuilder};
pub use dispatch::{Dispatcher, StrategyResult};
pub use error::{AssembleError, ConfigError, FlowError, Result};
pub use outcome::{evaluate, Outcome};
pub use output::{write_output, OutputFormat};
pub use resolver::{label_partitions, resolve};
pub use session::Session;

use indexmap::IndexMap;
use mixsyn_ml::{Classifier, Label};
use mixsyn_net::{Network, PartitionId};
use std::path::Path;
use std::time::Instant;

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The assembled network
    pub network: Network,
    /// Resolved label of every partition
    pub labels: IndexMap<PartitionId, Label>,
    /// Optimization units after combining
    pub groups: Vec<Group>,
    /// Per-group results, in group order
    pub results: Vec<StrategyResult>,
    /// Comparison with the original network
    pub outcome: Outcome,
}

impl RunReport {
    /// Whether the run changed the network
    pub fn changed(&self) -> bool {
        self.outcome.changed
    }

    /// Write the assembled network if it changed.
    ///
    /// The extension is validated first, so an unsupported file name is an
    /// error whether or not anything would have been written.
    pub fn write(&self, path: &Path, config: &RunConfig) -> Result<Option<OutputFormat>> {
        OutputFormat::from_path(path)?;
        if !self.changed() {
            return Ok(None);
        }
        write_output(&self.network, path, &config.write_options()).map(Some)
    }
}

/// Mixed synthesis engine
#[derive(Default)]
pub struct MixedSynthesis {
    classifier: Classifier,
    dispatcher: Dispatcher,
}

impl MixedSynthesis {
    /// Engine with the default classifier and pipelines
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom classifier
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Use a custom dispatcher
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Optimize the session's network
    pub fn run(&self, session: &Session, config: &RunConfig) -> Result<RunReport> {
        let (network, partitions) = session.partitioned()?;
        config
            .classifier_settings()
            .check()
            .map_err(ConfigError::from)?;

        let start = Instant::now();
        let view = partitions.view(network)?;
        tracing::info!(
            "Optimizing '{}': {} partitions, {} gates",
            network.name,
            view.len(),
            network.num_gates()
        );

        let labels = label_partitions(&view, config, &self.classifier)?;
        let groups = combine(&view, &labels, config.combine());
        tracing::info!("{} partitions in {} groups", labels.len(), groups.len());

        let mut results = self.dispatcher.dispatch(&view, &groups)?;
        let assembled = assemble(network, &view, &mut results)?;
        let outcome = evaluate(network, &assembled, start.elapsed());

        if outcome.changed {
            tracing::info!(
                "Gates {} → {}, depth {} → {}",
                outcome.original_gates,
                outcome.gates,
                outcome.original_depth,
                outcome.depth
            );
        } else {
            tracing::info!("No change made to network");
        }

        Ok(RunReport {
            network: assembled,
            labels,
            groups,
            results,
            outcome,
        })
    }
}
