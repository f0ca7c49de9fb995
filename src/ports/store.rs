//! Relational store port: read-only access to dimension tables.
//!
//! This trait abstracts the database (SQLite) from the dimension mapper.

/// Errors that can occur while querying the relational store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Unsupported database type: {0:?}")]
    UnsupportedDbType(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// One row of a `SELECT <label>, <key>` projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelKeyRow {
    /// Label column; NULL labels are reported as `None`.
    pub label: Option<String>,
    pub key: i64,
}

impl LabelKeyRow {
    pub fn new(label: impl Into<String>, key: i64) -> Self {
        Self {
            label: Some(label.into()),
            key,
        }
    }
}

/// Trait for relational stores holding dimension tables.
pub trait RelationalStore: Send + Sync {
    /// Execute a two-column projection query (label, key).
    ///
    /// Rows are returned in the order the store produces them.
    ///
    /// # Errors
    /// Returns error if the table is missing or the store is unreachable.
    fn query_label_keys(&self, query: &str) -> Result<Vec<LabelKeyRow>, StoreError>;
}

/// Check that a schema, table or column name is a plain SQL identifier.
///
/// Dimension queries are assembled from configured identifiers, so anything
/// other than `[A-Za-z_][A-Za-z0-9_]*` is refused.
///
/// # Errors
/// Returns `StoreError::InvalidIdentifier` for anything else.
pub fn validate_identifier(ident: &str) -> Result<&str, StoreError> {
    let mut chars = ident.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(ident)
    } else {
        Err(StoreError::InvalidIdentifier(ident.to_string()))
    }
}
