//! Dimension mapping: loads categorical lookups from the relational store
//! and holds the process-wide set used by every prediction.
//!
//! The set is built once at startup and then only read. A reload builds a
//! complete replacement first and swaps the shared `Arc` in one step, so a
//! request never sees a partially-populated lookup and a failed reload
//! leaves the previous set serving.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Dimension, DimensionLookup, DimensionSet};
use crate::ports::{validate_identifier, RelationalStore, StoreError};

/// Schema holding the dimension tables.
pub const CLINICAL_SCHEMA: &str = "clinical";
/// Label column shared by all dimension tables.
pub const DESCRIPTION_COLUMN: &str = "description";

/// Location of one dimension table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionTable {
    schema: String,
    table: String,
    key_column: String,
    label_column: String,
}

impl DimensionTable {
    /// Describe a dimension table; every identifier is validated.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidIdentifier` for non-identifier names.
    pub fn new(
        schema: &str,
        table: &str,
        key_column: &str,
        label_column: &str,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            schema: validate_identifier(schema)?.to_string(),
            table: validate_identifier(table)?.to_string(),
            key_column: validate_identifier(key_column)?.to_string(),
            label_column: validate_identifier(label_column)?.to_string(),
        })
    }

    /// `clinical.<dim>_dim` keyed by `<dim>_key`, labelled by `description`.
    #[must_use]
    pub fn standard(dimension: Dimension) -> Self {
        Self {
            schema: CLINICAL_SCHEMA.to_string(),
            table: format!("{dimension}_dim"),
            key_column: format!("{dimension}_key"),
            label_column: DESCRIPTION_COLUMN.to_string(),
        }
    }

    /// The two-column projection query.
    #[must_use]
    pub fn query(&self) -> String {
        format!(
            "SELECT {}, {} FROM {}.{}",
            self.label_column, self.key_column, self.schema, self.table
        )
    }

    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

/// Tables for the three dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionCatalog {
    pub gender: DimensionTable,
    pub race: DimensionTable,
    pub ethnicity: DimensionTable,
}

impl Default for DimensionCatalog {
    fn default() -> Self {
        Self {
            gender: DimensionTable::standard(Dimension::Gender),
            race: DimensionTable::standard(Dimension::Race),
            ethnicity: DimensionTable::standard(Dimension::Ethnicity),
        }
    }
}

/// Loads dimension tables into in-memory lookups.
pub struct DimensionMapper<S: RelationalStore + ?Sized> {
    store: Arc<S>,
}

impl<S: RelationalStore + ?Sized> DimensionMapper<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Materialize one table as a lower-cased label -> key lookup.
    ///
    /// Rows with a NULL or empty label are skipped. When two labels normalize
    /// to the same string the later row wins.
    ///
    /// # Errors
    /// Returns error if the query fails (missing table, store unreachable).
    pub fn load(&self, table: &DimensionTable) -> Result<DimensionLookup, StoreError> {
        let rows = self.store.query_label_keys(&table.query())?;

        let mut lookup = DimensionLookup::new();
        for row in rows {
            let Some(label) = row.label else {
                tracing::warn!(table = %table.qualified_name(), key = row.key, "Skipping NULL label");
                continue;
            };
            if label.is_empty() {
                tracing::warn!(table = %table.qualified_name(), key = row.key, "Skipping empty label");
                continue;
            }
            if let Some(previous) = lookup.insert(&label, row.key) {
                tracing::debug!(
                    table = %table.qualified_name(),
                    previous,
                    key = row.key,
                    "Duplicate normalized label, keeping later key"
                );
            }
        }

        tracing::info!(table = %table.qualified_name(), labels = lookup.len(), "Loaded dimension");
        Ok(lookup)
    }

    /// Load all three dimensions.
    ///
    /// # Errors
    /// Returns the first query failure; nothing is returned partially.
    pub fn load_all(&self, catalog: &DimensionCatalog) -> Result<DimensionSet, StoreError> {
        Ok(DimensionSet::new(
            self.load(&catalog.gender)?,
            self.load(&catalog.race)?,
            self.load(&catalog.ethnicity)?,
        ))
    }
}

/// Process-wide dimension set with whole-value replacement.
#[derive(Debug)]
pub struct LookupRegistry {
    current: RwLock<Arc<DimensionSet>>,
}

impl LookupRegistry {
    #[must_use]
    pub fn new(set: DimensionSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(set)),
        }
    }

    /// The currently installed set. Cheap: clones an `Arc`.
    #[must_use]
    pub fn snapshot(&self) -> Arc<DimensionSet> {
        // The guarded value is only ever replaced whole, so a poisoned lock
        // still holds a complete set.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a fully built set.
    pub fn replace(&self, set: DimensionSet) {
        let next = Arc::new(set);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Rebuild from the store and swap in on success.
    ///
    /// # Errors
    /// Returns the store error; the previous set stays installed.
    pub fn reload<S: RelationalStore + ?Sized>(
        &self,
        mapper: &DimensionMapper<S>,
        catalog: &DimensionCatalog,
    ) -> Result<ReloadReport, StoreError> {
        let set = mapper.load_all(catalog)?;
        let report = ReloadReport::for_set(&set);
        self.replace(set);
        tracing::info!(
            genders = report.genders,
            races = report.races,
            ethnicities = report.ethnicities,
            "Dimension lookups reloaded"
        );
        Ok(report)
    }
}

/// Summary of a completed reload.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadReport {
    pub genders: usize,
    pub races: usize,
    pub ethnicities: usize,
    pub loaded_at: DateTime<Utc>,
}

impl ReloadReport {
    fn for_set(set: &DimensionSet) -> Self {
        Self {
            genders: set.gender.len(),
            races: set.race.len(),
            ethnicities: set.ethnicity.len(),
            loaded_at: Utc::now(),
        }
    }
}

/// Known labels per dimension, as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionMetadata {
    pub genders: Vec<String>,
    pub races: Vec<String>,
    pub ethnicities: Vec<String>,
}

impl From<&DimensionSet> for DimensionMetadata {
    fn from(set: &DimensionSet) -> Self {
        Self {
            genders: set.gender.labels(),
            races: set.race.labels(),
            ethnicities: set.ethnicity.labels(),
        }
    }
}
