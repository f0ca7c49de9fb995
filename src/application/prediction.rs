//! Prediction service: runs the classifier on one feature vector.

use std::sync::Arc;

use crate::domain::FeatureVector;
use crate::ports::{Classifier, ClassifierInfo, ModelError};

/// Thin wrapper over a shared classifier.
///
/// The classifier is loaded once and never mutated, so the service is
/// freely shared across request workers.
pub struct PredictionService<C: Classifier + ?Sized> {
    classifier: Arc<C>,
}

impl<C: Classifier + ?Sized> PredictionService<C> {
    pub fn new(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    /// Probability of the positive (readmitted) class.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if the vector length differs
    /// from the classifier's input width, or any evaluation error.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let expected = self.classifier.n_features();
        if features.len() != expected {
            return Err(ModelError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }

        tracing::debug!(features = ?features.as_slice(), "Running classifier");

        let proba = self.classifier.predict_proba(&[features.as_slice()])?;
        let positive = proba
            .first()
            .map(|row| row[1])
            .ok_or_else(|| ModelError::Format("classifier returned no rows".into()))?;
        if !positive.is_finite() {
            return Err(ModelError::NonFinite);
        }

        tracing::debug!(probability = positive, "Prediction complete");
        Ok(positive)
    }

    #[must_use]
    pub fn info(&self) -> ClassifierInfo {
        self.classifier.info()
    }
}
