//! SQLite implementation of [`LexiconStore`].
//!
//! [`SqliteLexicon`] owns a [`StoreHandle`], which is either unopened or
//! holds the single process-wide connection. Every operation resolves the
//! handle first, so calls made before `open` fail with
//! [`StorageError::NotInitialized`] instead of silently doing nothing.
//! Writes run as independent statements; each one is idempotent or an
//! upsert, so callers can retry after a partial failure.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use qamus_core::{Collection, CollectionId, MembershipChange, SavedWord, Word, WordId};

use crate::error::StorageError;
use crate::health::{self, DictionaryHealth};
use crate::traits::LexiconStore;
use crate::{collections, search, words};

/// Connection slot of a [`SqliteLexicon`].
#[derive(Debug, Default)]
pub enum StoreHandle {
    /// No connection yet, or closed for a reset.
    #[default]
    Unopened,
    /// A configured, migrated connection.
    Open(Connection),
}

/// SQLite-backed implementation of [`LexiconStore`].
#[derive(Debug, Default)]
pub struct SqliteLexicon {
    handle: StoreHandle,
    path: Option<PathBuf>,
}

impl SqliteLexicon {
    /// A store with no connection. Every operation fails until reopened.
    pub fn unopened() -> Self {
        SqliteLexicon::default()
    }

    /// Opens (or creates) the database at `path` and brings the user tables
    /// up to date.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteLexicon {
            handle: StoreHandle::Open(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteLexicon {
            handle: StoreHandle::Open(conn),
            path: None,
        })
    }

    /// Wraps an already configured connection.
    pub fn from_connection(conn: Connection) -> Self {
        SqliteLexicon {
            handle: StoreHandle::Open(conn),
            path: None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.handle, StoreHandle::Open(_))
    }

    /// The file this store was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Closes the connection, releasing the SQLite file handle.
    ///
    /// A failed close still drops the connection; the error is logged since
    /// the caller is about to discard the handle either way.
    pub fn close(&mut self) {
        if let StoreHandle::Open(conn) = std::mem::take(&mut self.handle) {
            if let Err((conn, err)) = conn.close() {
                tracing::warn!(error = %err, "closing lexicon database failed, dropping handle");
                drop(conn);
            }
        }
    }

    /// The open connection, or `NotInitialized`.
    pub fn conn(&self) -> Result<&Connection, StorageError> {
        match &self.handle {
            StoreHandle::Open(conn) => Ok(conn),
            StoreHandle::Unopened => Err(StorageError::NotInitialized),
        }
    }
}

impl LexiconStore for SqliteLexicon {
    fn dictionary_health(&self) -> Result<DictionaryHealth, StorageError> {
        health::check(self.conn()?)
    }

    fn search(&self, query: &str) -> Result<Vec<Word>, StorageError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        search::search(self.conn()?, query)
    }

    fn lookup(&self, id: WordId) -> Result<Option<Word>, StorageError> {
        search::lookup(self.conn()?, id)
    }

    fn save_word(&mut self, word: &Word) -> Result<i64, StorageError> {
        words::save(self.conn()?, word)
    }

    fn delete_word(&mut self, id: WordId) -> Result<(), StorageError> {
        words::delete(self.conn()?, id)
    }

    fn list_saved_words(&self) -> Result<Vec<SavedWord>, StorageError> {
        words::list_saved(self.conn()?)
    }

    fn create_collection(&mut self, name: &str) -> Result<CollectionId, StorageError> {
        collections::create(self.conn()?, name)
    }

    fn rename_collection(&mut self, id: CollectionId, name: &str) -> Result<(), StorageError> {
        collections::rename(self.conn()?, id, name)
    }

    fn delete_collection(&mut self, id: CollectionId) -> Result<(), StorageError> {
        collections::delete(self.conn()?, id)
    }

    fn list_collections(&self) -> Result<Vec<Collection>, StorageError> {
        collections::list(self.conn()?)
    }

    fn add_membership(
        &mut self,
        word: WordId,
        collection: CollectionId,
    ) -> Result<(), StorageError> {
        collections::add_membership(self.conn()?, word, collection)
    }

    fn remove_membership(
        &mut self,
        word: WordId,
        collection: CollectionId,
    ) -> Result<(), StorageError> {
        collections::remove_membership(self.conn()?, word, collection)
    }

    fn collections_for_word(&self, word: WordId) -> Result<Vec<Collection>, StorageError> {
        collections::collections_of(self.conn()?, word)
    }

    fn words_in_collection(
        &self,
        collection: CollectionId,
    ) -> Result<Vec<SavedWord>, StorageError> {
        collections::members_of(self.conn()?, collection)
    }

    fn set_membership(
        &mut self,
        word: &Word,
        desired: &BTreeSet<CollectionId>,
    ) -> Result<MembershipChange, StorageError> {
        collections::set_membership(self.conn()?, word, desired)
    }
}
