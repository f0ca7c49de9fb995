//! SQLite adapter: Implementation of RelationalStore.
//!
//! Dimension tables are addressed as `<schema>.<table>`. In SQLite a schema
//! is an attached database, so each schema named in the store config is
//! attached under that name when the store is opened.
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`. Queries only happen at startup
//! and on explicit reloads, so contention is not a concern. A poisoned
//! mutex is reported as `StoreError::Unavailable`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OpenFlags};

use crate::config::StoreConfig;
use crate::ports::{validate_identifier, LabelKeyRow, RelationalStore, StoreError};

const IN_MEMORY: &str = ":memory:";

/// SQLite relational store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, read_only: bool) -> Result<Self, StoreError> {
        let conn = if read_only {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
            )?
        } else {
            Connection::open(path)?
        };
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Build a store from `db_config.yaml` settings.
    ///
    /// # Errors
    /// Returns `StoreError::UnsupportedDbType` for anything but `sqlite`, or
    /// a database error if opening or attaching fails.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        if !config.db_type.eq_ignore_ascii_case("sqlite") {
            return Err(StoreError::UnsupportedDbType(config.db_type.clone()));
        }

        let store = if config.database == IN_MEMORY {
            Self::in_memory()?
        } else {
            Self::open(&config.database, config.read_only)?
        };

        for (schema, path) in &config.attach {
            store.attach(schema, path)?;
        }

        tracing::info!(
            database = %config.database,
            read_only = config.read_only,
            attached = config.attach.len(),
            "Opened SQLite store"
        );
        Ok(store)
    }

    /// Attach another database file under a schema name.
    ///
    /// # Errors
    /// Returns error if the schema name is not a plain identifier or the
    /// attach fails.
    pub fn attach(&self, schema: &str, path: &str) -> Result<(), StoreError> {
        let schema = validate_identifier(schema)?;
        let conn = self.lock()?;
        conn.execute(&format!("ATTACH DATABASE ?1 AS {schema}"), params![path])?;
        tracing::debug!(schema, "Attached database");
        Ok(())
    }

    /// Run one or more statements (fixtures, maintenance).
    ///
    /// # Errors
    /// Returns error if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }
}

impl RelationalStore for SqliteStore {
    fn query_label_keys(&self, query: &str) -> Result<Vec<LabelKeyRow>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LabelKeyRow {
                    label: row.get(0)?,
                    key: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
