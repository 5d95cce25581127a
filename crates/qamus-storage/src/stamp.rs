//! Millisecond timestamps for `saved_at` / `created_at`.
//!
//! Stamps are wall-clock milliseconds but never repeat or go backwards
//! within a table, so "most recent first" orderings are total.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;

use crate::error::StorageError;

/// Milliseconds since the Unix epoch, 0 if the clock is before it.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Which timestamp column to advance.
#[derive(Debug, Clone, Copy)]
pub(crate) enum StampColumn {
    SavedAt,
    CreatedAt,
}

impl StampColumn {
    fn max_sql(self) -> &'static str {
        match self {
            StampColumn::SavedAt => "SELECT COALESCE(MAX(saved_at), 0) FROM saved_words",
            StampColumn::CreatedAt => "SELECT COALESCE(MAX(created_at), 0) FROM collections",
        }
    }
}

/// The current time, bumped past the newest existing stamp in the column.
pub(crate) fn next_stamp(conn: &Connection, column: StampColumn) -> Result<i64, StorageError> {
    let latest: i64 = conn.query_row(column.max_sql(), [], |row| row.get(0))?;
    Ok(now_millis().max(latest + 1))
}
