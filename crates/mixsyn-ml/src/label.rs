//! Optimization target labels

use mixsyn_synth::{Engine, Objective};
use serde::{Deserialize, Serialize};

/// Optimization target of a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// AIG pipeline, balanced
    Aig,
    /// MIG pipeline, balanced
    Mig,
    /// MIG pipeline tuned for depth
    Depth,
    /// AIG pipeline tuned for area
    Area,
    /// Left untouched
    Skip,
}

impl Label {
    /// All labels
    pub const ALL: [Label; 5] = [Label::Aig, Label::Mig, Label::Depth, Label::Area, Label::Skip];

    /// Whether the partition is copied through unchanged
    pub fn is_skip(self) -> bool {
        self == Label::Skip
    }

    /// Engine that optimizes partitions with this label
    pub fn engine(self) -> Option<Engine> {
        match self {
            Label::Aig | Label::Area => Some(Engine::Aig),
            Label::Mig | Label::Depth => Some(Engine::Mig),
            Label::Skip => None,
        }
    }

    /// What the engine is tuned toward
    pub fn objective(self) -> Objective {
        match self {
            Label::Area => Objective::Area,
            Label::Depth => Objective::Depth,
            Label::Aig | Label::Mig | Label::Skip => Objective::Balanced,
        }
    }
}

impl From<Engine> for Label {
    fn from(engine: Engine) -> Self {
        match engine {
            Engine::Aig => Label::Aig,
            Engine::Mig => Label::Mig,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Label::Aig => "AIG",
            Label::Mig => "MIG",
            Label::Depth => "DEPTH",
            Label::Area => "AREA",
            Label::Skip => "SKIP",
        };
        write!(f, "{}", name)
    }
}
