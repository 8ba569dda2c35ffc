//! Classification Models
//!
//! A classification model is an opaque scoring function from a partition's
//! feature vector to the probability that majority-based optimization suits
//! it better than AND-based optimization.
//!
//! [`LinearModel`] is a logistic regression stored as JSON, trainable
//! offline and usable without an external inference runtime:
//!
//! ```text
//! p(MIG) = sigmoid(bias + Σ weights[i] · features[i])
//! ```

use crate::features::{PartitionFeatures, NUM_FEATURES};
use crate::{MlError, MlResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trait for trained scoring models
pub trait ClassificationModel: Send + Sync {
    /// Probability in [0, 1] that the MIG engine is the better choice
    fn score(&self, features: &PartitionFeatures) -> f64;

    /// Name used in logs
    fn name(&self) -> &str {
        "model"
    }
}

/// Logistic regression over the partition feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// One weight per feature
    weights: Vec<f64>,
    /// Bias term
    bias: f64,
}

impl LinearModel {
    /// Create a model from explicit weights
    pub fn new(weights: Vec<f64>, bias: f64) -> MlResult<Self> {
        let model = Self { weights, bias };
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> MlResult<()> {
        if self.weights.len() != NUM_FEATURES {
            return Err(MlError::InvalidModel(format!(
                "expected {} weights, found {}",
                NUM_FEATURES,
                self.weights.len()
            )));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(MlError::InvalidModel("non-finite coefficient".to_string()));
        }
        Ok(())
    }

    /// Load a model from a JSON file
    pub fn load(path: impl AsRef<Path>) -> MlResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| MlError::ModelNotLoaded(format!("{}: {}", path.display(), e)))?;
        let model: Self = serde_json::from_str(&json)
            .map_err(|e| MlError::ModelNotLoaded(format!("{}: {}", path.display(), e)))?;
        model.check()?;

        tracing::debug!("Loaded classification model from {}", path.display());
        Ok(model)
    }

    /// Save the model to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    fn logit(&self, features: &PartitionFeatures) -> f64 {
        features
            .to_vector()
            .iter()
            .zip(&self.weights)
            .fold(self.bias, |acc, (x, w)| acc + x * w)
    }
}

impl ClassificationModel for LinearModel {
    fn score(&self, features: &PartitionFeatures) -> f64 {
        1.0 / (1.0 + (-self.logit(features)).exp())
    }

    fn name(&self) -> &str {
        "linear"
    }
}
