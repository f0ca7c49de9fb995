//! # Readmit
//!
//! Hospital readmission risk service.
//!
//! This crate provides:
//! - Feature vector construction from partial patient intake records
//! - Categorical dimension lookups loaded from a relational store
//! - Inference with a previously trained classifier artifact
//! - A small JSON HTTP API around the above
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (patient record, feature schema, lookups)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (SQLite, JSON model artifacts)
//! - `application`: Use cases orchestrating domain and ports
//! - `api`: HTTP surface (axum)

pub mod adapters;
pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{FeatureVector, PatientRecord, ReadmissionPrediction, RiskBand};

/// Result type for readmission service operations
pub type Result<T> = std::result::Result<T, ReadmitError>;

/// Main error type for the readmission service
#[derive(Debug, thiserror::Error)]
pub enum ReadmitError {
    #[error("Store operation failed: {0}")]
    Store(#[from] ports::StoreError),

    #[error("Model error: {0}")]
    Model(#[from] ports::ModelError),
}
