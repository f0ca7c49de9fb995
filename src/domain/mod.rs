//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O. Everything here is
//! cheap to construct in tests and safe to share across request workers.

mod dimension;
mod features;
mod patient;
mod prediction;

pub use dimension::{Dimension, DimensionLookup, DimensionSet};
pub use features::{
    DefaultTable, FeatureKind, FeatureSchema, FeatureSource, FeatureSpec, FeatureVector,
    SchemaError, FEATURE_NAMES, FEATURE_SCHEMA_VERSION,
};
pub use patient::{FieldValue, PatientRecord};
pub use prediction::{ReadmissionPrediction, RiskBand};
