//! Label resolution
//!
//! Forced sets always win over the classifier. Lookup order is skip, AIG,
//! MIG, depth, area, then the classifier's label.

use crate::config::RunConfig;
use crate::error::Result;
use indexmap::IndexMap;
use mixsyn_ml::{Classifier, Label};
use mixsyn_net::{PartitionId, PartitionView, Region, SubNetwork};
use rayon::prelude::*;

/// Final label of a partition given what the classifier chose
pub fn resolve(id: PartitionId, classified: Label, config: &RunConfig) -> Label {
    config.forced_label(id).unwrap_or(classified)
}

/// Label every partition of a view.
///
/// Forced partitions are never classified. The others are classified in
/// parallel, each on its own extracted sub-network.
pub fn label_partitions(
    view: &PartitionView<'_>,
    config: &RunConfig,
    classifier: &Classifier,
) -> Result<IndexMap<PartitionId, Label>> {
    let ids = view.partition_ids();

    for (label, forced) in config.overrides() {
        for id in forced.iter().filter(|id| !ids.contains(id)) {
            tracing::warn!("Partition {} forced to {} does not exist", id, label);
        }
    }

    let labels: Vec<(PartitionId, Label)> = ids
        .par_iter()
        .map(|&id| -> Result<(PartitionId, Label)> {
            if let Some(label) = config.forced_label(id) {
                return Ok((id, label));
            }
            let sub = SubNetwork::extract(view.network(), view, &Region::single(id))?;
            let classified = classifier.classify(&sub.network, config.classifier_settings())?;
            Ok((id, resolve(id, classified, config)))
        })
        .collect::<Result<_>>()?;

    for (id, label) in &labels {
        tracing::debug!("Partition {} labeled {}", id, label);
    }
    Ok(labels.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixsyn_ml::{CostModel, Projection};
    use mixsyn_net::{Network, PartitionManager, Signal};
    use mixsyn_synth::Engine;

    /// AIG always projects smaller
    struct AigWins;

    impl CostModel for AigWins {
        fn project(&self, _network: &Network, engine: Engine) -> Projection {
            match engine {
                Engine::Aig => Projection { area: 1, delay: 1 },
                Engine::Mig => Projection { area: 2, delay: 2 },
            }
        }
    }

    fn three_partitions() -> (Network, PartitionManager) {
        let mut ntk = Network::new("three");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let x = ntk.add_and(a, b);
        let y = ntk.add_and(x, a.invert());
        let z = ntk.add_and(y, b.invert());
        ntk.add_output("z", z);
        let assignment = [0, 0, 0, 0, 1, 2].into_iter().map(PartitionId).collect();
        let manager = PartitionManager::new(&ntk, assignment).unwrap();
        (ntk, manager)
    }

    #[test]
    fn test_resolve_order() {
        let config = RunConfig::builder()
            .force(Label::Mig, [PartitionId(1)])
            .force(Label::Area, [PartitionId(2)])
            .skip([PartitionId(2), PartitionId(3)])
            .build()
            .unwrap();

        assert_eq!(resolve(PartitionId(0), Label::Aig, &config), Label::Aig);
        assert_eq!(resolve(PartitionId(1), Label::Aig, &config), Label::Mig);
        assert_eq!(resolve(PartitionId(2), Label::Aig, &config), Label::Skip);
        assert_eq!(resolve(PartitionId(3), Label::Mig, &config), Label::Skip);
    }

    #[test]
    fn test_label_partitions_mixes_forced_and_classified() {
        let (ntk, manager) = three_partitions();
        let view = manager.view(&ntk).unwrap();
        let config = RunConfig::builder()
            .force(Label::Depth, [PartitionId(1)])
            .skip([PartitionId(2), PartitionId(9)])
            .build()
            .unwrap();
        let classifier = Classifier::with_cost_model(Box::new(AigWins));

        let labels = label_partitions(&view, &config, &classifier).unwrap();
        let expected: Vec<(PartitionId, Label)> = vec![
            (PartitionId(0), Label::Aig),
            (PartitionId(1), Label::Depth),
            (PartitionId(2), Label::Skip),
        ];
        assert_eq!(labels.into_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_global_flag_labels_unforced_partitions() {
        let (ntk, manager) = three_partitions();
        let view = manager.view(&ntk).unwrap();
        let config = RunConfig::builder()
            .global_mig(true)
            .force(Label::Area, [PartitionId(0)])
            .build()
            .unwrap();
        assert!(config.classifier_settings().global_mig);

        let classifier = Classifier::with_cost_model(Box::new(AigWins));
        let labels = label_partitions(&view, &config, &classifier).unwrap();
        assert_eq!(labels[&PartitionId(0)], Label::Area);
        assert_eq!(labels[&PartitionId(1)], Label::Mig);
        assert_eq!(labels[&PartitionId(2)], Label::Mig);
    }
}
