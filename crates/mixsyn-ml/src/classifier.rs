//! Partition Classifier
//!
//! Maps a partition's sub-network to a [`Label`]. Three sources decide, in
//! order of precedence:
//!
//! 1. A global engine flag labels every partition AIG or MIG.
//! 2. A trained [`ClassificationModel`] scores the feature vector; a score
//!    of at least 0.5 means MIG.
//! 3. A heuristic [`StrategyMode`] compares the projected outcome of both
//!    engines, as estimated by a pluggable [`CostModel`].
//!
//! Ties always go to MIG, since a majority network can express anything an
//! AND network can.

use crate::features::FeatureExtractor;
use crate::label::Label;
use crate::model::ClassificationModel;
use crate::{MlError, MlResult};
use mixsyn_net::Network;
use mixsyn_synth::{pipeline_for, Engine, Objective};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Model score at or above which a partition is labeled MIG
const MIG_SCORE_THRESHOLD: f64 = 0.5;

/// Cost function selector for heuristic classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum StrategyMode {
    /// Minimize area × delay (mode 0)
    #[default]
    AreaDelay,
    /// Minimize area (mode 1)
    Area,
    /// Minimize delay (mode 2)
    Delay,
    /// Minimize delay under a delay ceiling (mode 3). A partition neither
    /// engine brings under the ceiling is labeled DEPTH.
    DelayThreshold,
}

impl TryFrom<u32> for StrategyMode {
    type Error = MlError;

    fn try_from(value: u32) -> MlResult<Self> {
        match value {
            0 => Ok(StrategyMode::AreaDelay),
            1 => Ok(StrategyMode::Area),
            2 => Ok(StrategyMode::Delay),
            3 => Ok(StrategyMode::DelayThreshold),
            other => Err(MlError::InvalidConfig(format!(
                "strategy mode {} is not one of 0 (area-delay), 1 (area), 2 (delay), 3 (delay threshold)",
                other
            ))),
        }
    }
}

impl From<StrategyMode> for u32 {
    fn from(mode: StrategyMode) -> u32 {
        match mode {
            StrategyMode::AreaDelay => 0,
            StrategyMode::Area => 1,
            StrategyMode::Delay => 2,
            StrategyMode::DelayThreshold => 3,
        }
    }
}

/// Projected area and delay of a sub-network after optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Projection {
    /// Gate count
    pub area: usize,
    /// Logic depth
    pub delay: u32,
}

impl Projection {
    /// Projection of a network as it stands
    pub fn of(network: &Network) -> Self {
        Self {
            area: network.num_gates(),
            delay: network.depth(),
        }
    }

    /// Area-delay product
    pub fn area_delay(&self) -> u64 {
        self.area as u64 * self.delay as u64
    }
}

/// Estimates what an engine would make of a sub-network
pub trait CostModel: Send + Sync {
    /// Project the outcome of optimizing `network` with `engine`
    fn project(&self, network: &Network, engine: Engine) -> Projection;
}

/// Cost model that runs the engine's balanced pipeline on a copy
#[derive(Debug, Clone, Copy, Default)]
pub struct TrialCostModel;

impl CostModel for TrialCostModel {
    fn project(&self, network: &Network, engine: Engine) -> Projection {
        let trial = pipeline_for(engine, Objective::Balanced).run(network);
        Projection::of(&trial)
    }
}

/// Inputs to classification that are fixed for a whole run
#[derive(Clone, Default)]
pub struct ClassifierSettings {
    /// Label every partition AIG
    pub global_aig: bool,
    /// Label every partition MIG
    pub global_mig: bool,
    /// Trained model, consulted before the heuristic
    pub model: Option<Arc<dyn ClassificationModel>>,
    /// Heuristic strategy mode
    pub mode: StrategyMode,
    /// Delay ceiling in logic levels for [`StrategyMode::DelayThreshold`]
    pub threshold: u32,
}

impl ClassifierSettings {
    /// Heuristic classification with the given mode
    pub fn heuristic(mode: StrategyMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Model-driven classification
    pub fn with_model(model: Arc<dyn ClassificationModel>) -> Self {
        Self {
            model: Some(model),
            ..Default::default()
        }
    }

    /// Reject contradictory settings
    pub fn check(&self) -> MlResult<()> {
        if self.global_aig && self.global_mig {
            return Err(MlError::InvalidConfig(
                "global AIG and global MIG optimization are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClassifierSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierSettings")
            .field("global_aig", &self.global_aig)
            .field("global_mig", &self.global_mig)
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .field("mode", &self.mode)
            .field("threshold", &self.threshold)
            .finish()
    }
}

/// Partition classifier
pub struct Classifier {
    extractor: FeatureExtractor,
    cost_model: Box<dyn CostModel>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Classifier using trial optimization as its cost model
    pub fn new() -> Self {
        Self::with_cost_model(Box::new(TrialCostModel))
    }

    /// Classifier with a custom cost model
    pub fn with_cost_model(cost_model: Box<dyn CostModel>) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            cost_model,
        }
    }

    /// Label a partition's sub-network
    pub fn classify(&self, network: &Network, settings: &ClassifierSettings) -> MlResult<Label> {
        settings.check()?;

        if settings.global_aig {
            return Ok(Label::Aig);
        }
        if settings.global_mig {
            return Ok(Label::Mig);
        }

        if let Some(model) = &settings.model {
            let features = self.extractor.extract(network);
            let score = model.score(&features);
            let label = if score >= MIG_SCORE_THRESHOLD {
                Label::Mig
            } else {
                Label::Aig
            };
            tracing::trace!("{}: {} score {:.3} → {}", network.name, model.name(), score, label);
            return Ok(label);
        }

        let aig = self.cost_model.project(network, Engine::Aig);
        let mig = self.cost_model.project(network, Engine::Mig);
        let label = decide(settings.mode, settings.threshold, aig, mig);
        tracing::trace!(
            "{}: AIG {}/{}, MIG {}/{} (area/delay) → {}",
            network.name,
            aig.area,
            aig.delay,
            mig.area,
            mig.delay,
            label
        );
        Ok(label)
    }
}

/// MIG unless the AIG key is strictly smaller
fn prefer<K: Ord>(aig: K, mig: K) -> Label {
    if aig < mig {
        Label::Aig
    } else {
        Label::Mig
    }
}

fn decide(mode: StrategyMode, threshold: u32, aig: Projection, mig: Projection) -> Label {
    match mode {
        StrategyMode::AreaDelay => prefer(aig.area_delay(), mig.area_delay()),
        StrategyMode::Area => prefer(aig.area, mig.area),
        StrategyMode::Delay => prefer(aig.delay, mig.delay),
        StrategyMode::DelayThreshold => {
            if aig.delay > threshold && mig.delay > threshold {
                Label::Depth
            } else {
                prefer(aig.delay, mig.delay)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::PartitionFeatures;
    use mixsyn_net::Signal;

    struct FixedCost {
        aig: Projection,
        mig: Projection,
    }

    impl CostModel for FixedCost {
        fn project(&self, _network: &Network, engine: Engine) -> Projection {
            match engine {
                Engine::Aig => self.aig,
                Engine::Mig => self.mig,
            }
        }
    }

    struct ConstantModel(f64);

    impl ClassificationModel for ConstantModel {
        fn score(&self, _features: &PartitionFeatures) -> f64 {
            self.0
        }
    }

    fn fixed(aig: (usize, u32), mig: (usize, u32)) -> Classifier {
        Classifier::with_cost_model(Box::new(FixedCost {
            aig: Projection {
                area: aig.0,
                delay: aig.1,
            },
            mig: Projection {
                area: mig.0,
                delay: mig.1,
            },
        }))
    }

    fn majority_sop() -> Network {
        let mut ntk = Network::new("maj");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let c = Signal::new(ntk.add_input("c"));
        let ab = ntk.add_and(a, b);
        let ac = ntk.add_and(a, c);
        let bc = ntk.add_and(b, c);
        let t = ntk.add_or(ab, ac);
        let m = ntk.add_or(t, bc);
        ntk.add_output("m", m);
        ntk
    }

    #[test]
    fn test_strategy_mode_from_u32() {
        assert_eq!(StrategyMode::try_from(0).unwrap(), StrategyMode::AreaDelay);
        assert_eq!(StrategyMode::try_from(3).unwrap(), StrategyMode::DelayThreshold);
        assert!(matches!(
            StrategyMode::try_from(4),
            Err(MlError::InvalidConfig(_))
        ));
        assert_eq!(u32::from(StrategyMode::Delay), 2);
    }

    #[test]
    fn test_global_flags() {
        let ntk = majority_sop();
        let classifier = fixed((1, 1), (9, 9));

        let mig_only = ClassifierSettings {
            global_mig: true,
            ..Default::default()
        };
        assert_eq!(classifier.classify(&ntk, &mig_only).unwrap(), Label::Mig);

        let both = ClassifierSettings {
            global_aig: true,
            global_mig: true,
            ..Default::default()
        };
        assert!(matches!(
            classifier.classify(&ntk, &both),
            Err(MlError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_model_decides_engine() {
        let ntk = majority_sop();
        // Heuristic would pick AIG; the model wins
        let classifier = fixed((1, 1), (9, 9));

        let settings = ClassifierSettings::with_model(Arc::new(ConstantModel(0.9)));
        assert_eq!(classifier.classify(&ntk, &settings).unwrap(), Label::Mig);

        let settings = ClassifierSettings::with_model(Arc::new(ConstantModel(0.1)));
        assert_eq!(classifier.classify(&ntk, &settings).unwrap(), Label::Aig);

        let settings = ClassifierSettings::with_model(Arc::new(ConstantModel(0.5)));
        assert_eq!(classifier.classify(&ntk, &settings).unwrap(), Label::Mig);
    }

    #[test]
    fn test_heuristic_modes() {
        let ntk = Network::new("any");
        // AIG: smaller area, deeper. MIG: larger, shallower.
        let classifier = fixed((10, 6), (12, 4));

        let label = |mode| {
            classifier
                .classify(&ntk, &ClassifierSettings::heuristic(mode))
                .unwrap()
        };
        assert_eq!(label(StrategyMode::AreaDelay), Label::Mig); // 60 vs 48
        assert_eq!(label(StrategyMode::Area), Label::Aig);
        assert_eq!(label(StrategyMode::Delay), Label::Mig);
    }

    #[test]
    fn test_ties_go_to_mig() {
        let ntk = Network::new("any");
        let classifier = fixed((8, 3), (8, 3));
        for mode in [StrategyMode::AreaDelay, StrategyMode::Area, StrategyMode::Delay] {
            let settings = ClassifierSettings::heuristic(mode);
            assert_eq!(classifier.classify(&ntk, &settings).unwrap(), Label::Mig);
        }
    }

    #[test]
    fn test_delay_threshold() {
        let ntk = Network::new("any");
        let settings = |threshold| ClassifierSettings {
            mode: StrategyMode::DelayThreshold,
            threshold,
            ..Default::default()
        };

        let classifier = fixed((10, 6), (12, 4));
        // Neither meets the ceiling
        assert_eq!(classifier.classify(&ntk, &settings(3)).unwrap(), Label::Depth);
        // Only MIG meets it
        assert_eq!(classifier.classify(&ntk, &settings(5)).unwrap(), Label::Mig);
        // Both meet it: the shallower one wins despite its larger area
        assert_eq!(classifier.classify(&ntk, &settings(6)).unwrap(), Label::Mig);

        // Only AIG meets it
        let classifier = fixed((12, 4), (10, 6));
        assert_eq!(classifier.classify(&ntk, &settings(5)).unwrap(), Label::Aig);

        // Equal delay under the ceiling goes to MIG
        let classifier = fixed((8, 4), (20, 4));
        assert_eq!(classifier.classify(&ntk, &settings(4)).unwrap(), Label::Mig);
    }

    #[test]
    fn test_trial_cost_model_prefers_mig_for_majority() {
        let ntk = majority_sop();
        let aig = TrialCostModel.project(&ntk, Engine::Aig);
        let mig = TrialCostModel.project(&ntk, Engine::Mig);
        assert_eq!(mig.area, 1);
        assert!(aig.area > mig.area);

        let label = Classifier::new()
            .classify(&ntk, &ClassifierSettings::default())
            .unwrap();
        assert_eq!(label, Label::Mig);
    }
}
