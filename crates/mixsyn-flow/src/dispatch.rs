//! Strategy Dispatcher
//!
//! Runs the pipeline matching each group's label on the group's extracted
//! sub-network. Groups share no mutable state, so they are optimized in
//! parallel and joined before assembly.
//!
//! | Label | Pipeline                |
//! |-------|-------------------------|
//! | AIG   | AIG, balanced           |
//! | AREA  | AIG, area               |
//! | MIG   | MIG, balanced           |
//! | DEPTH | MIG, depth              |
//! | SKIP  | none (identity)         |

use crate::combiner::Group;
use crate::error::Result;
use indexmap::IndexMap;
use mixsyn_ml::Label;
use mixsyn_net::{Network, NodeId, PartitionView, SubNetwork};
use mixsyn_synth::{pipeline_for, Objective, Pipeline};
use rayon::prelude::*;

/// Optimized logic of one group
#[derive(Debug, Clone)]
pub struct StrategyResult {
    /// The group that was optimized
    pub group: Group,
    /// Original nodes feeding the group, one per sub-network input
    pub leaves: Vec<NodeId>,
    /// Original gates read outside the group, one per sub-network output
    pub roots: Vec<NodeId>,
    /// Resulting logic (the extracted logic when nothing improved)
    pub network: Network,
    /// Gates before optimization
    pub gates_before: usize,
    /// Depth before optimization
    pub depth_before: u32,
    /// Whether `network` replaces the group's original logic
    pub improved: bool,
}

impl StrategyResult {
    /// Result that keeps the group's logic as it is
    fn unchanged(group: &Group, sub: &SubNetwork) -> Self {
        Self {
            group: group.clone(),
            leaves: sub.leaves.clone(),
            roots: sub.roots.clone(),
            network: sub.network.clone(),
            gates_before: sub.network.num_gates(),
            depth_before: sub.network.depth(),
            improved: false,
        }
    }

    /// Gates after optimization
    pub fn gates_after(&self) -> usize {
        self.network.num_gates()
    }

    /// Depth after optimization
    pub fn depth_after(&self) -> u32 {
        self.network.depth()
    }
}

/// Whether `after` is strictly better than `before` for a label
fn improves(label: Label, before: &Network, after: &Network) -> bool {
    let (g0, d0) = (before.num_gates() as u64, before.depth() as u64);
    let (g1, d1) = (after.num_gates() as u64, after.depth() as u64);
    match label.objective() {
        Objective::Area => (g1, d1) < (g0, d0),
        Objective::Depth => (d1, g1) < (d0, g0),
        Objective::Balanced => (g1 * d1, g1, d1) < (g0 * d0, g0, d0),
    }
}

/// Maps labels to optimization pipelines
pub struct Dispatcher {
    pipelines: IndexMap<Label, Box<dyn Pipeline>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher with the standard pipeline for every label
    pub fn new() -> Self {
        let pipelines = [Label::Aig, Label::Area, Label::Mig, Label::Depth]
            .into_iter()
            .filter_map(|label| {
                let engine = label.engine()?;
                Some((label, pipeline_for(engine, label.objective())))
            })
            .collect();
        Self { pipelines }
    }

    /// Replace the pipeline used for a label
    pub fn with_pipeline(mut self, label: Label, pipeline: Box<dyn Pipeline>) -> Self {
        if !label.is_skip() {
            self.pipelines.insert(label, pipeline);
        }
        self
    }

    /// Pipeline used for a label
    pub fn pipeline(&self, label: Label) -> Option<&dyn Pipeline> {
        self.pipelines.get(&label).map(|p| p.as_ref())
    }

    /// Optimize one group's sub-network.
    ///
    /// SKIP groups and groups without logic are passed through untouched.
    /// A pipeline result that does not strictly improve the label's
    /// objective is discarded.
    pub fn optimize(&self, group: &Group, sub: &SubNetwork) -> StrategyResult {
        let mut result = StrategyResult::unchanged(group, sub);
        if sub.is_empty() {
            return result;
        }
        let Some(pipeline) = self.pipeline(group.label) else {
            return result;
        };

        let optimized = pipeline.run(&sub.network);
        let fits = optimized.num_inputs() == sub.leaves.len()
            && optimized.num_outputs() == sub.roots.len();
        if !fits {
            tracing::warn!(
                "{} changed the interface of {}, keeping original logic",
                pipeline.name(),
                group
            );
            return result;
        }

        if improves(group.label, &sub.network, &optimized) {
            result.network = optimized;
            result.improved = true;
        }
        tracing::debug!(
            "{} via {}: gates {} → {}, depth {} → {}{}",
            group,
            pipeline.name(),
            result.gates_before,
            result.gates_after(),
            result.depth_before,
            result.depth_after(),
            if result.improved { "" } else { " (no improvement)" }
        );
        result
    }

    /// Extract and optimize every group in parallel
    pub fn dispatch(&self, view: &PartitionView<'_>, groups: &[Group]) -> Result<Vec<StrategyResult>> {
        let results = groups
            .par_iter()
            .map(|group| -> Result<StrategyResult> {
                let sub = SubNetwork::extract(view.network(), view, &group.region)?;
                Ok(self.optimize(group, &sub))
            })
            .collect::<Result<Vec<_>>>()?;

        let improved = results.iter().filter(|r| r.improved).count();
        tracing::info!("Optimized {} of {} groups", improved, results.len());
        Ok(results)
    }
}
