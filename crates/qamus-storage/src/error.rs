//! Storage error types for qamus-storage.
//!
//! [`StorageError`] covers the failure modes of the lexicon store: an
//! unopened handle, SQLite failures, migration failures, and the
//! collection-level conflicts callers are expected to handle.

use rusqlite::ffi;
use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An operation ran before the store connection was opened.
    #[error("database not initialized")]
    NotInitialized,

    /// SQLite reported an error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A collection with the given ID was not found.
    #[error("collection not found: {0}")]
    CollectionNotFound(i64),

    /// Another collection already uses this name.
    #[error("collection name already in use: '{0}'")]
    DuplicateCollectionName(String),

    /// Collection names must contain a non-whitespace character.
    #[error("collection name must not be blank")]
    InvalidCollectionName,

    /// A data integrity violation was detected.
    #[error("integrity error: {reason}")]
    IntegrityError { reason: String },
}

impl StorageError {
    /// True for SQLite constraint failures with the given extended code.
    pub(crate) fn is_constraint(err: &rusqlite::Error, extended_code: i32) -> bool {
        matches!(err.sqlite_error(), Some(e) if e.extended_code == extended_code)
    }

    /// True when `err` is a UNIQUE constraint failure.
    pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
        Self::is_constraint(err, ffi::SQLITE_CONSTRAINT_UNIQUE)
    }

    /// True when `err` is a FOREIGN KEY constraint failure.
    pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
        Self::is_constraint(err, ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
    }
}
