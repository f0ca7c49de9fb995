//! Feature schema for the readmission classifier.
//!
//! The classifier has no knowledge of feature names and relies entirely on
//! positional alignment, so the order declared here is a contract with the
//! trained model artifact. Changing it requires retraining and bumping
//! [`FEATURE_SCHEMA_VERSION`].

use std::collections::HashMap;

use super::dimension::Dimension;
use super::patient::{FieldValue, PatientRecord};

/// Version tag co-deployed with model artifacts.
pub const FEATURE_SCHEMA_VERSION: &str = "readmission-v1";

/// Feature names in classifier order.
pub const FEATURE_NAMES: [&str; 22] = [
    "age",
    "gender_key",
    "race_key",
    "ethnicity_key",
    "has_diabetes",
    "has_hypertension",
    "has_copd",
    "has_asthma",
    "has_heart_failure",
    "has_arthritis",
    "has_depression",
    "has_kidney_disease",
    "has_cancer",
    "has_alzheimers",
    "chronic_dx_count",
    "num_meds",
    "has_anticoagulant",
    "has_antibiotic",
    "has_steroid",
    "num_procedures",
    "had_surgery",
    "had_biopsy",
];

/// Errors raised while configuring the schema or its defaults.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Expected {expected} features, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Semantic category of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Age,
    CategoricalKey,
    Flag,
    Count,
}

/// Typed accessor over a [`PatientRecord`].
#[derive(Clone, Copy)]
pub enum FeatureSource {
    /// Free-text label resolved through a dimension lookup.
    Categorical {
        dimension: Dimension,
        label: fn(&PatientRecord) -> Option<&str>,
    },
    /// Scalar coerced to a number.
    Scalar(fn(&PatientRecord) -> Option<&FieldValue>),
}

impl std::fmt::Debug for FeatureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Categorical { dimension, .. } => write!(f, "Categorical({dimension})"),
            Self::Scalar(_) => write!(f, "Scalar"),
        }
    }
}

/// One schema entry.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
    pub source: FeatureSource,
}

macro_rules! scalar {
    ($name:ident, $kind:expr) => {
        FeatureSpec {
            name: stringify!($name),
            kind: $kind,
            source: FeatureSource::Scalar(|r| r.$name.as_ref()),
        }
    };
}

macro_rules! categorical {
    ($name:literal, $field:ident, $dim:expr) => {
        FeatureSpec {
            name: $name,
            kind: FeatureKind::CategoricalKey,
            source: FeatureSource::Categorical {
                dimension: $dim,
                label: |r| r.$field.as_deref(),
            },
        }
    };
}

/// Ordered list of features the classifier expects.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    version: &'static str,
    specs: Vec<FeatureSpec>,
}

impl FeatureSchema {
    /// The `readmission-v1` schema.
    #[must_use]
    pub fn readmission_v1() -> Self {
        use FeatureKind::{Age, Count, Flag};

        let specs = vec![
            scalar!(age, Age),
            categorical!("gender_key", gender, Dimension::Gender),
            categorical!("race_key", race, Dimension::Race),
            categorical!("ethnicity_key", ethnicity, Dimension::Ethnicity),
            scalar!(has_diabetes, Flag),
            scalar!(has_hypertension, Flag),
            scalar!(has_copd, Flag),
            scalar!(has_asthma, Flag),
            scalar!(has_heart_failure, Flag),
            scalar!(has_arthritis, Flag),
            scalar!(has_depression, Flag),
            scalar!(has_kidney_disease, Flag),
            scalar!(has_cancer, Flag),
            scalar!(has_alzheimers, Flag),
            scalar!(chronic_dx_count, Count),
            scalar!(num_meds, Count),
            scalar!(has_anticoagulant, Flag),
            scalar!(has_antibiotic, Flag),
            scalar!(has_steroid, Flag),
            scalar!(num_procedures, Count),
            scalar!(had_surgery, Flag),
            scalar!(had_biopsy, Flag),
        ];
        debug_assert!(specs.iter().map(|s| s.name).eq(FEATURE_NAMES));

        Self {
            version: FEATURE_SCHEMA_VERSION,
            specs,
        }
    }

    #[must_use]
    pub fn version(&self) -> &'static str {
        self.version
    }

    #[must_use]
    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|s| s.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::readmission_v1()
    }
}

/// Fallback value per feature, used when a source value is missing,
/// unmapped, or fails numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultTable {
    values: HashMap<&'static str, f64>,
}

impl DefaultTable {
    /// Zero for every feature: no age, unknown key, no count, flag false.
    #[must_use]
    pub fn standard(schema: &FeatureSchema) -> Self {
        let values = schema.names().map(|name| (name, 0.0)).collect();
        Self { values }
    }

    /// Override the fallback for one feature.
    ///
    /// # Errors
    /// Returns `SchemaError::UnknownFeature` if the name is not in the table.
    pub fn with(mut self, name: &str, value: f64) -> Result<Self, SchemaError> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(self)
            }
            None => Err(SchemaError::UnknownFeature(name.to_string())),
        }
    }

    /// Fallback for a feature; 0 for names outside the schema.
    #[must_use]
    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    /// Defaults laid out in schema order.
    #[must_use]
    pub fn to_vec(&self, schema: &FeatureSchema) -> Vec<f64> {
        schema.names().map(|name| self.get(name)).collect()
    }
}

/// Ordered numeric representation of a patient.
///
/// Only constructible with exactly one value per schema entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap raw values, checking them against the schema length.
    ///
    /// # Errors
    /// Returns `SchemaError::LengthMismatch` if the lengths differ.
    pub fn from_values(schema: &FeatureSchema, values: Vec<f64>) -> Result<Self, SchemaError> {
        if values.len() != schema.len() {
            return Err(SchemaError::LengthMismatch {
                expected: schema.len(),
                actual: values.len(),
            });
        }
        Ok(Self { values })
    }

    pub(crate) fn from_built(values: Vec<f64>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}
