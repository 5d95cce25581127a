//! Dictionary table health check.
//!
//! The provisioning layer uses this to decide whether the live database
//! must be replaced with a fresh copy of the bundle.

use rusqlite::Connection;

use crate::error::StorageError;
use crate::schema::{table_exists, DICTIONARY_TABLE};

/// State of the bundled dictionary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryHealth {
    /// Present with `rows` entries.
    Healthy { rows: u64 },
    /// The table does not exist.
    MissingTable,
    /// The table exists but has no rows.
    Empty,
}

impl DictionaryHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, DictionaryHealth::Healthy { .. })
    }
}

/// Inspects the dictionary table on `conn`.
pub fn check(conn: &Connection) -> Result<DictionaryHealth, StorageError> {
    if !table_exists(conn, DICTIONARY_TABLE)? {
        return Ok(DictionaryHealth::MissingTable);
    }
    let rows: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {DICTIONARY_TABLE}"),
        [],
        |row| row.get(0),
    )?;
    if rows == 0 {
        return Ok(DictionaryHealth::Empty);
    }
    Ok(DictionaryHealth::Healthy { rows: rows as u64 })
}
