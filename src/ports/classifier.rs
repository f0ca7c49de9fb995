//! Classifier port: Trait for a previously trained binary classifier.
//!
//! This trait abstracts the model artifact format from the prediction
//! service.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Errors that can occur while loading or evaluating a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model file not found at: {0}")]
    NotFound(String),

    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model format: {0}")]
    Format(String),

    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Model integrity check failed: {0}")]
    Integrity(String),

    #[error("Expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model produced a non-finite probability")]
    NonFinite,
}

/// Descriptive metadata about a loaded classifier.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierInfo {
    /// Estimator family, e.g. `logistic_regression`
    pub kind: &'static str,
    pub schema_version: String,
    pub feature_names: Vec<String>,
    /// SHA-256 of the artifact bytes (hex)
    pub sha256: String,
    /// When the artifact was parsed and validated
    pub loaded_at: DateTime<Utc>,
}

/// Trait for binary classifiers producing per-class probabilities.
pub trait Classifier: Send + Sync {
    /// Number of input features per row.
    fn n_features(&self) -> usize;

    /// Estimate `[P(negative), P(positive)]` for each row of the batch.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if a row has the wrong length.
    fn predict_proba(&self, batch: &[&[f64]]) -> Result<Vec<[f64; 2]>, ModelError>;

    /// Metadata for diagnostics endpoints.
    fn info(&self) -> ClassifierInfo;
}
