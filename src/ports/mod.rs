//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (relational store,
//! trained classifier).

mod classifier;
mod store;

pub use classifier::{Classifier, ClassifierInfo, ModelError};
pub use store::{validate_identifier, LabelKeyRow, RelationalStore, StoreError};
