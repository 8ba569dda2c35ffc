//! Partition Classification
//!
//! Decides, per partition, which optimization target suits it best. A
//! partition is labeled AIG, MIG, DEPTH, AREA or SKIP, either by a trained
//! scoring model or by a heuristic strategy mode comparing the projected
//! outcome of both engines.
//!
//! ```text
//! sub-network ──► FeatureExtractor ──► ClassificationModel ──► AIG | MIG
//!      │
//!      └────────► CostModel (AIG, MIG) ──► StrategyMode ──► AIG | MIG | DEPTH
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mixsyn_ml::{Classifier, ClassifierSettings, StrategyMode};
//!
//! let classifier = Classifier::new();
//! let settings = ClassifierSettings::heuristic(StrategyMode::AreaDelay);
//! let label = classifier.classify(&sub.network, &settings)?;
//! ```

pub mod classifier;
pub mod features;
pub mod label;
pub mod model;

pub use classifier::{
    Classifier, ClassifierSettings, CostModel, Projection, StrategyMode, TrialCostModel,
};
pub use features::{extract_features, FeatureExtractor, PartitionFeatures, NUM_FEATURES};
pub use label::Label;
pub use model::{ClassificationModel, LinearModel};

use thiserror::Error;

/// Errors that can occur during classification
#[derive(Debug, Error)]
pub enum MlError {
    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for classification
pub type MlResult<T> = Result<T, MlError>;
