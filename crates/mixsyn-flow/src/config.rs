//! Run configuration
//!
//! A [`RunConfig`] is built once per invocation, either from command line
//! flags through [`RunConfigBuilder`] or from a TOML file, and never changes
//! during the run.
//!
//! ```toml
//! strategy = 3
//! threshold = 12
//! combine = true
//! model = "models/classifier.json"
//!
//! [partitions]
//! aig = [0, 1]
//! skip = [4]
//! ```

use crate::error::ConfigError;
use indexmap::IndexMap;
use mixsyn_ml::{ClassificationModel, ClassifierSettings, Label, LinearModel, StrategyMode};
use mixsyn_net::{PartitionId, WriteOptions};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Partition IDs forced to a label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForcedPartitions {
    pub aig: BTreeSet<PartitionId>,
    pub mig: BTreeSet<PartitionId>,
    pub depth: BTreeSet<PartitionId>,
    pub area: BTreeSet<PartitionId>,
    pub skip: BTreeSet<PartitionId>,
}

impl ForcedPartitions {
    /// Sets in lookup order; the first set holding an ID decides its label
    fn in_lookup_order(&self) -> [(Label, &BTreeSet<PartitionId>); 5] {
        [
            (Label::Skip, &self.skip),
            (Label::Aig, &self.aig),
            (Label::Mig, &self.mig),
            (Label::Depth, &self.depth),
            (Label::Area, &self.area),
        ]
    }

    /// IDs present in more than one of the AIG/MIG/depth/area sets
    fn conflicts(&self) -> Vec<PartitionId> {
        let mut counts: BTreeMap<PartitionId, usize> = BTreeMap::new();
        for set in [&self.aig, &self.mig, &self.depth, &self.area] {
            for &id in set {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(id, _)| id)
            .collect()
    }
}

/// Builder for [`RunConfig`], also the TOML file layout
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfigBuilder {
    /// Heuristic strategy mode (0-3)
    strategy: u32,
    /// Delay ceiling for strategy 3
    threshold: u32,
    /// Path of a trained classification model
    model: Option<PathBuf>,
    /// Optimize every partition as AIG
    global_aig: bool,
    /// Optimize every partition as MIG
    global_mig: bool,
    /// Merge adjacent partitions with the same label
    combine: bool,
    /// Leave feedthrough outputs out of written netlists
    skip_feedthrough: bool,
    /// Forced labels
    partitions: ForcedPartitions,
    #[serde(skip)]
    loaded_model: Option<Arc<dyn ClassificationModel>>,
}

impl RunConfigBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a builder from a TOML file.
    ///
    /// A relative model path is taken relative to the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        let mut builder: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;

        if let (Some(model), Some(dir)) = (&builder.model, path.parent()) {
            if model.is_relative() {
                builder.model = Some(dir.join(model));
            }
        }
        Ok(builder)
    }

    /// Write the builder as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, contents)
            .map_err(|e| ConfigError::Write(format!("{}: {}", path.display(), e)))
    }

    pub fn strategy(mut self, mode: u32) -> Self {
        self.strategy = mode;
        self
    }

    pub fn threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Load a model from this path when building
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model = Some(path.into());
        self
    }

    /// Use an already loaded model (takes precedence over a model path)
    pub fn model(mut self, model: Arc<dyn ClassificationModel>) -> Self {
        self.loaded_model = Some(model);
        self
    }

    pub fn global_aig(mut self, enabled: bool) -> Self {
        self.global_aig = enabled;
        self
    }

    pub fn global_mig(mut self, enabled: bool) -> Self {
        self.global_mig = enabled;
        self
    }

    pub fn combine(mut self, enabled: bool) -> Self {
        self.combine = enabled;
        self
    }

    pub fn skip_feedthrough(mut self, enabled: bool) -> Self {
        self.skip_feedthrough = enabled;
        self
    }

    /// Force partitions to a label. `Label::Skip` adds to the skip set.
    pub fn force(mut self, label: Label, ids: impl IntoIterator<Item = PartitionId>) -> Self {
        let set = match label {
            Label::Aig => &mut self.partitions.aig,
            Label::Mig => &mut self.partitions.mig,
            Label::Depth => &mut self.partitions.depth,
            Label::Area => &mut self.partitions.area,
            Label::Skip => &mut self.partitions.skip,
        };
        set.extend(ids);
        self
    }

    /// Leave partitions untouched
    pub fn skip(self, ids: impl IntoIterator<Item = PartitionId>) -> Self {
        self.force(Label::Skip, ids)
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        if self.global_aig && self.global_mig {
            return Err(ConfigError::ConflictingGlobalFlags);
        }

        let conflicts = self.partitions.conflicts();
        if !conflicts.is_empty() {
            return Err(ConfigError::ConflictingOverrides(conflicts));
        }

        let mode = StrategyMode::try_from(self.strategy)?;

        let model = match (self.loaded_model, &self.model) {
            (Some(model), _) => Some(model),
            (None, Some(path)) => {
                Some(Arc::new(LinearModel::load(path)?) as Arc<dyn ClassificationModel>)
            }
            (None, None) => None,
        };

        let overrides = self
            .partitions
            .in_lookup_order()
            .into_iter()
            .map(|(label, ids)| (label, ids.clone()))
            .collect();

        Ok(RunConfig {
            settings: ClassifierSettings {
                global_aig: self.global_aig,
                global_mig: self.global_mig,
                model,
                mode,
                threshold: self.threshold,
            },
            combine: self.combine,
            skip_feedthrough: self.skip_feedthrough,
            overrides,
        })
    }
}

/// Immutable configuration of one optimization run
#[derive(Debug, Clone)]
pub struct RunConfig {
    settings: ClassifierSettings,
    combine: bool,
    skip_feedthrough: bool,
    overrides: IndexMap<Label, BTreeSet<PartitionId>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            settings: ClassifierSettings::default(),
            combine: false,
            skip_feedthrough: false,
            overrides: IndexMap::new(),
        }
    }
}

impl RunConfig {
    /// Start building a configuration
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::new()
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        RunConfigBuilder::load(path)?.build()
    }

    /// Settings handed to the classifier
    pub fn classifier_settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// Whether adjacent partitions with the same label are merged
    pub fn combine(&self) -> bool {
        self.combine
    }

    /// Options for writing the resulting netlist
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            skip_feedthrough: self.skip_feedthrough,
        }
    }

    /// Forced sets in lookup order
    pub fn overrides(&self) -> &IndexMap<Label, BTreeSet<PartitionId>> {
        &self.overrides
    }

    /// Label forced on a partition, if any
    pub fn forced_label(&self, id: PartitionId) -> Option<Label> {
        self.overrides
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(label, _)| *label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixsyn_ml::{MlError, NUM_FEATURES};

    fn ids(v: &[u32]) -> Vec<PartitionId> {
        v.iter().copied().map(PartitionId).collect()
    }

    #[test]
    fn test_default_config() {
        let config = RunConfig::builder().build().unwrap();
        assert!(!config.combine());
        assert_eq!(config.classifier_settings().mode, StrategyMode::AreaDelay);
        assert!(config.classifier_settings().model.is_none());
        assert_eq!(config.forced_label(PartitionId(0)), None);
    }

    #[test]
    fn test_both_global_flags_rejected() {
        let result = RunConfig::builder().global_aig(true).global_mig(true).build();
        assert!(matches!(result, Err(ConfigError::ConflictingGlobalFlags)));
    }

    #[test]
    fn test_double_forced_ids_reported_together() {
        let result = RunConfig::builder()
            .force(Label::Aig, ids(&[1, 2, 3]))
            .force(Label::Mig, ids(&[3]))
            .force(Label::Area, ids(&[1]))
            .build();
        match result {
            Err(ConfigError::ConflictingOverrides(conflicts)) => {
                assert_eq!(conflicts, ids(&[1, 3]));
            }
            other => panic!("expected conflicting overrides, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_skip_may_overlap_forced_sets() {
        let config = RunConfig::builder()
            .force(Label::Depth, ids(&[2]))
            .skip(ids(&[2]))
            .build()
            .unwrap();
        assert_eq!(config.forced_label(PartitionId(2)), Some(Label::Skip));
    }

    #[test]
    fn test_invalid_strategy() {
        let result = RunConfig::builder().strategy(7).build();
        assert!(matches!(
            result,
            Err(ConfigError::Ml(MlError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_load_toml_with_relative_model() {
        let dir = tempfile::tempdir().unwrap();
        LinearModel::new(vec![0.0; NUM_FEATURES], 1.0)
            .unwrap()
            .save(dir.path().join("model.json"))
            .unwrap();
        let path = dir.path().join("run.toml");
        fs::write(
            &path,
            r#"
strategy = 3
threshold = 12
combine = true
model = "model.json"

[partitions]
aig = [0, 1]
skip = [4]
"#,
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert!(config.combine());
        assert_eq!(config.classifier_settings().mode, StrategyMode::DelayThreshold);
        assert_eq!(config.classifier_settings().threshold, 12);
        assert!(config.classifier_settings().model.is_some());
        assert_eq!(config.forced_label(PartitionId(1)), Some(Label::Aig));
        assert_eq!(config.forced_label(PartitionId(4)), Some(Label::Skip));
        assert_eq!(config.forced_label(PartitionId(2)), None);
    }

    #[test]
    fn test_builder_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        RunConfig::builder()
            .strategy(2)
            .force(Label::Mig, ids(&[5]))
            .save(&path)
            .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.classifier_settings().mode, StrategyMode::Delay);
        assert_eq!(config.forced_label(PartitionId(5)), Some(Label::Mig));
    }

    #[test]
    fn test_save_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("run.toml");
        let err = RunConfig::builder().save(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Write(_)));
        assert!(err.to_string().starts_with("Failed to write run configuration"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, "stratgy = 1\n").unwrap();
        assert!(matches!(RunConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_model_file() {
        let result = RunConfig::builder().model_path("/nonexistent/model.json").build();
        assert!(matches!(
            result,
            Err(ConfigError::Ml(MlError::ModelNotLoaded(_)))
        ));
    }
}
