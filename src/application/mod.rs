//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

pub mod dimensions;
pub mod feature_builder;
pub mod prediction;
pub mod readmission;

pub use dimensions::{
    DimensionCatalog, DimensionMapper, DimensionMetadata, DimensionTable, LookupRegistry,
    ReloadReport,
};
pub use feature_builder::{build_feature_vector, FeatureVectorBuilder};
pub use prediction::PredictionService;
pub use readmission::ReadmissionService;
