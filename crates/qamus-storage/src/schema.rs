//! SQL schema setup for the lexicon database.
//!
//! The dictionary table (`data`) is shipped pre-populated and never touched
//! here. The live file is a copy of that bundle, so its `user_version` is
//! whatever the bundle was built with. The base user tables are therefore
//! created with `CREATE TABLE IF NOT EXISTS` on every open, independent of
//! `user_version`. Later migrations go through `rusqlite_migration`, which
//! is skipped when the file reports a version this build does not know.
//! Columns added after the first release are backfilled into older
//! `saved_words` tables after checking the table metadata, so a genuine
//! `ALTER TABLE` failure still surfaces.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection};
use rusqlite_migration::{Migrations, M};

use crate::error::StorageError;

/// Name of the bundled, read-only dictionary table.
pub const DICTIONARY_TABLE: &str = "data";

/// `saved_words` columns that older databases may lack.
pub const OPTIONAL_SAVED_WORD_COLUMNS: &[&str] = &[
    "root_ntws",
    "root_1",
    "lemma_search",
    "lemma_bw",
    "form_bw",
    "analysis",
    "annotator",
];

/// Base user tables. Every statement is `IF NOT EXISTS`.
const USER_TABLES: &str = include_str!("migrations/001_user_tables.sql");

/// Migration scripts in order; index + 1 is the `user_version` each one
/// leaves behind.
const MIGRATIONS: &[&str] = &[
    USER_TABLES,
    // Future migrations added here.
];

/// All schema migrations, applied in order via `user_version` tracking.
fn migrations() -> Migrations<'static> {
    Migrations::new(MIGRATIONS.iter().map(|&sql| M::up(sql)).collect())
}

/// Opens (or creates) a SQLite database at `path` with WAL mode, foreign keys,
/// and the user tables in place.
pub fn open_database(path: &Path) -> Result<Connection, StorageError> {
    let mut conn = Connection::open(path)?;
    configure_and_migrate(&mut conn)?;
    Ok(conn)
}

/// Opens an in-memory SQLite database with the same configuration.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    let mut conn = Connection::open_in_memory()?;
    configure_and_migrate(&mut conn)?;
    Ok(conn)
}

/// Configures pragmas, applies pending migrations and backfills columns.
///
/// Idempotent: safe to run on every startup.
pub fn configure_and_migrate(conn: &mut Connection) -> Result<(), StorageError> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    // Off by default in SQLite; without it the membership cascades are inert.
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(USER_TABLES)?;

    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version > MIGRATIONS.len() as i64 {
        tracing::warn!(
            version,
            known = MIGRATIONS.len(),
            "database user_version set by the bundle, skipping migrations"
        );
    } else {
        migrations()
            .to_latest(conn)
            .map_err(|e| StorageError::Migration(e.to_string()))?;
    }

    backfill_saved_word_columns(conn)?;
    Ok(())
}

/// Adds any [`OPTIONAL_SAVED_WORD_COLUMNS`] missing from `saved_words`.
///
/// Returns the names of the columns that were added.
pub fn backfill_saved_word_columns(conn: &Connection) -> Result<Vec<&'static str>, StorageError> {
    let existing = table_columns(conn, "saved_words")?;
    let mut added = Vec::new();
    for column in OPTIONAL_SAVED_WORD_COLUMNS {
        if existing.contains(*column) {
            continue;
        }
        conn.execute_batch(&format!("ALTER TABLE saved_words ADD COLUMN {column} TEXT"))?;
        tracing::debug!(column, "added missing saved_words column");
        added.push(*column);
    }
    Ok(added)
}

/// Lower-cased column names of `table`, empty if the table does not exist.
pub fn table_columns(conn: &Connection, table: &str) -> Result<HashSet<String>, StorageError> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let rows = stmt.query_map(params![table], |row| row.get::<_, String>(0))?;
    let mut columns = HashSet::new();
    for row in rows {
        columns.insert(row?.to_ascii_lowercase());
    }
    Ok(columns)
}

/// Whether a table named `name` exists.
pub fn table_exists(conn: &Connection, name: &str) -> Result<bool, StorageError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        params![name],
        |row| row.get(0),
    )?;
    Ok(exists)
}
