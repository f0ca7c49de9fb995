//! Patient record types for readmission risk prediction.
//!
//! Every field is independently optional. Numeric and boolean fields are
//! carried as loosely-typed [`FieldValue`]s so that intake data which is
//! partially filled or sent with the wrong scalar type still produces a
//! usable feature vector.

use serde::{Deserialize, Serialize};

/// A loosely-typed scalar as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Coerce to a feature number using integer-conversion semantics.
    ///
    /// Booleans become 1/0, integers pass through, finite floats are
    /// truncated toward zero and text is parsed as a base-10 integer after
    /// trimming whitespace. Anything else yields `None`.
    #[must_use]
    pub fn coerce(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) if f.is_finite() => Some(f.trunc()),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse::<i64>().ok().map(|i| i as f64),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Patient features submitted for a readmission prediction.
///
/// Missing fields are `None`; defaults are applied when the feature vector is
/// built, never here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientRecord {
    // Demographics
    pub age: Option<FieldValue>,
    /// Free-text label, e.g. "m" or "f".
    pub gender: Option<String>,
    pub race: Option<String>,
    pub ethnicity: Option<String>,

    // Chronic conditions
    pub has_diabetes: Option<FieldValue>,
    pub has_hypertension: Option<FieldValue>,
    pub has_copd: Option<FieldValue>,
    pub has_asthma: Option<FieldValue>,
    pub has_heart_failure: Option<FieldValue>,
    pub has_arthritis: Option<FieldValue>,
    pub has_depression: Option<FieldValue>,
    pub has_kidney_disease: Option<FieldValue>,
    pub has_cancer: Option<FieldValue>,
    pub has_alzheimers: Option<FieldValue>,
    /// Total chronic diagnoses.
    pub chronic_dx_count: Option<FieldValue>,

    // Medications
    pub num_meds: Option<FieldValue>,
    pub has_anticoagulant: Option<FieldValue>,
    pub has_antibiotic: Option<FieldValue>,
    pub has_steroid: Option<FieldValue>,

    // Procedures
    pub num_procedures: Option<FieldValue>,
    pub had_surgery: Option<FieldValue>,
    pub had_biopsy: Option<FieldValue>,
}
