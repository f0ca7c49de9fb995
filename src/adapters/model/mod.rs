//! Model adapter: Implementation of Classifier from a JSON artifact.
//!
//! The training pipeline exports the selected estimator (logistic regression
//! or gradient-boosted trees, whichever scored the better AUC) together with
//! the feature names it was trained on.
//!
//! # Integrity
//!
//! - The artifact's `feature_names` must equal the serving feature schema,
//!   in order. Positional misalignment would silently corrupt every
//!   prediction, so any difference refuses the load.
//! - A SHA-256 digest of the artifact bytes is always computed. If a
//!   sidecar `<artifact>.sha256` exists it must match; with
//!   `require_digest` set the sidecar is mandatory.
//!
//! # Numeric behavior
//!
//! Tree splits compare features as `f32`, matching the float32 batch the
//! estimator was trained and evaluated on. A value strictly below the
//! threshold goes left.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::FeatureSchema;
use crate::ports::{Classifier, ClassifierInfo, ModelError};

/// Artifact format understood by this adapter.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Model artifact as written by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub schema_version: String,
    pub feature_names: Vec<String>,
    pub estimator: Estimator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    GradientBoostedTrees(TreeEnsemble),
}

impl Estimator {
    fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::GradientBoostedTrees(_) => "gradient_boosted_trees",
        }
    }
}

/// Standardization applied before the linear model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl LogisticRegression {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.coefficients.len() != n_features {
            return Err(ModelError::Format(format!(
                "expected {n_features} coefficients, got {}",
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Format("non-finite coefficient".into()));
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != n_features || scaler.scale.len() != n_features {
                return Err(ModelError::Format(format!(
                    "scaler must have {n_features} entries"
                )));
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(ModelError::Format("scaler scale must be finite and non-zero".into()));
            }
        }
        Ok(())
    }

    fn margin(&self, row: &[f64]) -> f64 {
        let dot: f64 = match &self.scaler {
            Some(scaler) => row
                .iter()
                .zip(&self.coefficients)
                .zip(scaler.mean.iter().zip(&scaler.scale))
                .map(|((x, c), (m, s))| c * (x - m) / s)
                .sum(),
            None => row.iter().zip(&self.coefficients).map(|(x, c)| c * x).sum(),
        };
        self.intercept + dot
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    /// Prior probability the margins are added to (0.5 means zero offset)
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    /// Node 0 is the root; children always follow their parent.
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split(Split),
    Leaf(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Split {
    pub feature: usize,
    pub threshold: f32,
    pub left: usize,
    pub right: usize,
    /// Branch taken for a missing (NaN) value
    #[serde(default)]
    pub default_left: bool,
}

impl Tree {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Format("empty tree".into()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf(v) if !v.is_finite() => {
                    return Err(ModelError::Format(format!("non-finite leaf at node {idx}")));
                }
                Node::Leaf(_) => {}
                Node::Split(split) => {
                    if split.feature >= n_features {
                        return Err(ModelError::Format(format!(
                            "node {idx} splits on feature {} (only {n_features})",
                            split.feature
                        )));
                    }
                    let in_range = |child: usize| child > idx && child < self.nodes.len();
                    if !in_range(split.left) || !in_range(split.right) {
                        return Err(ModelError::Format(format!(
                            "node {idx} has out-of-order children"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(value) => return *value,
                Node::Split(split) => {
                    let x = row[split.feature] as f32;
                    let go_left = if x.is_nan() {
                        split.default_left
                    } else {
                        x < split.threshold
                    };
                    idx = if go_left { split.left } else { split.right };
                }
            }
        }
    }
}

impl TreeEnsemble {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if !(self.base_score > 0.0 && self.base_score < 1.0) {
            return Err(ModelError::Format(format!(
                "base_score {} must lie in (0, 1)",
                self.base_score
            )));
        }
        self.trees.iter().try_for_each(|t| t.validate(n_features))
    }

    fn margin(&self, row: &[f64]) -> f64 {
        let offset = (self.base_score / (1.0 - self.base_score)).ln();
        offset + self.trees.iter().map(|t| t.leaf_value(row)).sum::<f64>()
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Lower-case hex SHA-256 of a byte slice.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// `<artifact>.sha256` next to the artifact.
#[must_use]
pub fn digest_sidecar_path(model_path: &Path) -> PathBuf {
    let mut name = model_path.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

/// Options controlling artifact loading.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub require_digest: bool,
}

/// Classifier backed by a JSON model artifact.
#[derive(Debug)]
pub struct JsonClassifier {
    estimator: Estimator,
    info: ClassifierInfo,
}

impl JsonClassifier {
    /// Load and validate an artifact from disk.
    ///
    /// # Errors
    /// Returns error if the file is missing, unreadable, malformed, fails the
    /// digest check, or was trained against a different feature schema.
    pub fn load(
        path: &Path,
        schema: &FeatureSchema,
        options: LoadOptions,
    ) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }
        tracing::info!("Loading model from {}", path.display());

        let bytes = std::fs::read(path)?;
        let digest = sha256_hex(&bytes);
        verify_sidecar(path, &digest, options.require_digest)?;

        let classifier = Self::from_bytes(&bytes, schema)?;
        tracing::info!(
            kind = classifier.info.kind,
            sha256 = %classifier.info.sha256,
            "Model loaded"
        );
        Ok(classifier)
    }

    /// Parse and validate artifact bytes.
    ///
    /// # Errors
    /// Returns error on malformed JSON or a schema mismatch.
    pub fn from_bytes(bytes: &[u8], schema: &FeatureSchema) -> Result<Self, ModelError> {
        let artifact: ModelArtifact =
            serde_json::from_slice(bytes).map_err(|e| ModelError::Format(e.to_string()))?;
        let sha256 = sha256_hex(bytes);
        Self::from_artifact(artifact, schema, sha256)
    }

    fn from_artifact(
        artifact: ModelArtifact,
        schema: &FeatureSchema,
        sha256: String,
    ) -> Result<Self, ModelError> {
        if artifact.format_version != MODEL_FORMAT_VERSION {
            return Err(ModelError::Format(format!(
                "unsupported format_version {}",
                artifact.format_version
            )));
        }
        if artifact.schema_version != schema.version() {
            return Err(ModelError::SchemaMismatch(format!(
                "artifact schema {:?}, serving schema {:?}",
                artifact.schema_version,
                schema.version()
            )));
        }
        if !artifact.feature_names.iter().map(String::as_str).eq(schema.names()) {
            let first_diff = artifact
                .feature_names
                .iter()
                .map(String::as_str)
                .zip(schema.names())
                .position(|(a, b)| a != b);
            return Err(ModelError::SchemaMismatch(match first_diff {
                Some(pos) => format!("feature order differs at position {pos}"),
                None => format!(
                    "artifact has {} features, schema has {}",
                    artifact.feature_names.len(),
                    schema.len()
                ),
            }));
        }

        let n = schema.len();
        match &artifact.estimator {
            Estimator::LogisticRegression(lr) => lr.validate(n)?,
            Estimator::GradientBoostedTrees(gbt) => gbt.validate(n)?,
        }

        let info = ClassifierInfo {
            kind: artifact.estimator.kind(),
            schema_version: artifact.schema_version,
            feature_names: artifact.feature_names,
            sha256,
            loaded_at: Utc::now(),
        };
        Ok(Self {
            estimator: artifact.estimator,
            info,
        })
    }

    fn positive_probability(&self, row: &[f64]) -> Result<f64, ModelError> {
        let margin = match &self.estimator {
            Estimator::LogisticRegression(lr) => lr.margin(row),
            Estimator::GradientBoostedTrees(gbt) => gbt.margin(row),
        };
        let p = sigmoid(margin);
        if p.is_nan() {
            return Err(ModelError::NonFinite);
        }
        Ok(p.clamp(0.0, 1.0))
    }
}

fn verify_sidecar(path: &Path, digest: &str, required: bool) -> Result<(), ModelError> {
    let sidecar = digest_sidecar_path(path);
    if !sidecar.exists() {
        if required {
            return Err(ModelError::Integrity(format!(
                "missing digest file {}",
                sidecar.display()
            )));
        }
        tracing::warn!("No digest file for model; integrity not verified");
        return Ok(());
    }

    // sha256sum format: "<hex>  <filename>"
    let content = std::fs::read_to_string(&sidecar)?;
    let expected = content.split_whitespace().next().unwrap_or_default();
    if !expected.eq_ignore_ascii_case(digest) {
        return Err(ModelError::Integrity(format!(
            "digest mismatch: expected {expected}, computed {digest}"
        )));
    }
    tracing::debug!("Model digest verified");
    Ok(())
}

impl Classifier for JsonClassifier {
    fn n_features(&self) -> usize {
        self.info.feature_names.len()
    }

    fn predict_proba(&self, batch: &[&[f64]]) -> Result<Vec<[f64; 2]>, ModelError> {
        batch
            .iter()
            .map(|row| {
                if row.len() != self.n_features() {
                    return Err(ModelError::DimensionMismatch {
                        expected: self.n_features(),
                        actual: row.len(),
                    });
                }
                let p = self.positive_probability(row)?;
                Ok([1.0 - p, p])
            })
            .collect()
    }

    fn info(&self) -> ClassifierInfo {
        self.info.clone()
    }
}
