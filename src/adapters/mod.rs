//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external libraries:
//! - `model`: JSON classifier artifacts (serde_json, sha2)
//! - `sqlite`: SQLite dimension tables (rusqlite)
//! - `sanitize`: PII filtering for logs

pub mod model;
pub mod sanitize;
pub mod sqlite;

pub use model::{JsonClassifier, LoadOptions};
pub use sqlite::SqliteStore;
