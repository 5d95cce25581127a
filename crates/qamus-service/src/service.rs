//! LexiconService: the single coordinator between callers and the store.
//!
//! Owns the store handle and the provisioning collaborator. Lifecycle
//! (`initialize`, `reset_database`) lives here, as do the two error
//! policies: search failures degrade to an empty result, every other
//! failure is logged and returned to the caller.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use qamus_core::{Collection, CollectionId, MembershipChange, SavedWord, Word, WordId};
use qamus_storage::traits::LexiconStore;
use qamus_storage::{DictionaryHealth, SqliteLexicon, StorageError};

use crate::config::Config;
use crate::error::ServiceError;
use crate::provision::{FileBundle, FileState, ProvisionError, Provisioner};

/// The central service for search, saved words and collections.
pub struct LexiconService {
    store: SqliteLexicon,
    provisioner: Provisioner,
    db_path: PathBuf,
}

/// Logs a failed operation and converts its error.
fn logged<T>(operation: &'static str, result: Result<T, StorageError>) -> Result<T, ServiceError> {
    result.map_err(|err| {
        tracing::error!(operation, error = %err, "lexicon operation failed");
        ServiceError::from(err)
    })
}

impl LexiconService {
    /// Creates an unopened service for `config`. Call
    /// [`initialize`](Self::initialize) before anything else.
    pub fn new(config: &Config) -> Self {
        let provisioner = Provisioner::new(
            Box::new(FileBundle::new(&config.bundle_path)),
            config.min_db_bytes,
        );
        Self::with_provisioner(&config.db_path, provisioner)
    }

    /// Creates an unopened service with a custom provisioner.
    pub fn with_provisioner(db_path: &Path, provisioner: Provisioner) -> Self {
        LexiconService {
            store: SqliteLexicon::unopened(),
            provisioner,
            db_path: db_path.to_path_buf(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn is_initialized(&self) -> bool {
        self.store.is_open()
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &SqliteLexicon {
        &self.store
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Provisions the live database if needed, opens it, and verifies the
    /// dictionary table, resetting once if the table is missing or empty.
    ///
    /// Failures are fatal to the session and are returned after logging.
    pub fn initialize(&mut self) -> Result<DictionaryHealth, ServiceError> {
        let result = self.try_initialize();
        if let Err(err) = &result {
            tracing::error!(error = %err, "failed to initialize database");
        }
        result
    }

    fn try_initialize(&mut self) -> Result<DictionaryHealth, ServiceError> {
        match self.provisioner.inspect(&self.db_path)? {
            FileState::Missing => {
                tracing::info!(
                    path = %self.db_path.display(),
                    "database not found, copying bundle"
                );
                self.provisioner.install(&self.db_path)?;
            }
            FileState::Undersized { bytes } => {
                tracing::warn!(bytes, "database file is too small, re-copying bundle");
                if let Err(err) = self.provisioner.remove(&self.db_path) {
                    tracing::warn!(error = %err, "failed to remove undersized database");
                }
                self.provisioner.install(&self.db_path)?;
            }
            FileState::Present { bytes } => {
                tracing::debug!(bytes, "existing database found");
            }
        }

        self.store.close();
        self.store = SqliteLexicon::open(&self.db_path)?;

        let health = self.store.dictionary_health()?;
        if let DictionaryHealth::Healthy { rows } = health {
            tracing::info!(rows, "database initialized");
            return Ok(health);
        }

        tracing::warn!(?health, "dictionary table unusable, forcing reset");
        self.reset_database()?;
        let health = self.store.dictionary_health()?;
        if !health.is_healthy() {
            return Err(ProvisionError::UnusableBundle(self.provisioner.source().describe()).into());
        }
        tracing::info!(?health, "database initialized after reset");
        Ok(health)
    }

    /// Drops all stored state and re-provisions from the bundle.
    ///
    /// The live connection is closed before the files are removed, so the
    /// old SQLite handle is released rather than left dangling.
    pub fn reset_database(&mut self) -> Result<(), ServiceError> {
        tracing::info!(path = %self.db_path.display(), "resetting database");
        self.store.close();

        if let Err(err) = self.provisioner.remove(&self.db_path) {
            tracing::warn!(error = %err, "failed to remove old database");
        }

        let result = self
            .provisioner
            .install(&self.db_path)
            .map_err(ServiceError::from)
            .and_then(|_| SqliteLexicon::open(&self.db_path).map_err(ServiceError::from));
        match result {
            Ok(store) => {
                self.store = store;
                tracing::info!("database reset complete");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "database reset failed");
                Err(err)
            }
        }
    }

    /// Current state of the dictionary table.
    pub fn dictionary_health(&self) -> Result<DictionaryHealth, ServiceError> {
        logged("dictionary_health", self.store.dictionary_health())
    }

    // -------------------------------------------------------------------
    // Dictionary
    // -------------------------------------------------------------------

    /// Ranked search, capped at 50 results.
    ///
    /// Never fails: a storage error is logged and reported as no results.
    pub fn search(&self, query: &str) -> Vec<Word> {
        match self.store.search(query) {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(query, error = %err, "search failed, returning no results");
                Vec::new()
            }
        }
    }

    pub fn lookup(&self, id: WordId) -> Result<Option<Word>, ServiceError> {
        logged("lookup", self.store.lookup(id))
    }

    // -------------------------------------------------------------------
    // Saved words
    // -------------------------------------------------------------------

    pub fn save_word(&mut self, word: &Word) -> Result<i64, ServiceError> {
        logged("save_word", self.store.save_word(word))
    }

    pub fn delete_word(&mut self, id: WordId) -> Result<(), ServiceError> {
        logged("delete_word", self.store.delete_word(id))
    }

    pub fn list_saved_words(&self) -> Result<Vec<SavedWord>, ServiceError> {
        logged("list_saved_words", self.store.list_saved_words())
    }

    // -------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------

    pub fn create_collection(&mut self, name: &str) -> Result<CollectionId, ServiceError> {
        let id = logged("create_collection", self.store.create_collection(name))?;
        tracing::debug!(name, %id, "collection created");
        Ok(id)
    }

    pub fn rename_collection(&mut self, id: CollectionId, name: &str) -> Result<(), ServiceError> {
        logged("rename_collection", self.store.rename_collection(id, name))
    }

    pub fn delete_collection(&mut self, id: CollectionId) -> Result<(), ServiceError> {
        logged("delete_collection", self.store.delete_collection(id))?;
        tracing::debug!(%id, "collection deleted");
        Ok(())
    }

    pub fn list_collections(&self) -> Result<Vec<Collection>, ServiceError> {
        logged("list_collections", self.store.list_collections())
    }

    // -------------------------------------------------------------------
    // Membership
    // -------------------------------------------------------------------

    pub fn add_membership(
        &mut self,
        word: WordId,
        collection: CollectionId,
    ) -> Result<(), ServiceError> {
        logged("add_membership", self.store.add_membership(word, collection))
    }

    pub fn remove_membership(
        &mut self,
        word: WordId,
        collection: CollectionId,
    ) -> Result<(), ServiceError> {
        logged("remove_membership", self.store.remove_membership(word, collection))
    }

    pub fn collections_for_word(&self, word: WordId) -> Result<Vec<Collection>, ServiceError> {
        logged("collections_for_word", self.store.collections_for_word(word))
    }

    pub fn words_in_collection(
        &self,
        collection: CollectionId,
    ) -> Result<Vec<SavedWord>, ServiceError> {
        logged("words_in_collection", self.store.words_in_collection(collection))
    }

    /// Reconciles a word's collections to `desired`; an empty set removes
    /// the saved word.
    pub fn set_membership(
        &mut self,
        word: &Word,
        desired: &BTreeSet<CollectionId>,
    ) -> Result<MembershipChange, ServiceError> {
        logged("set_membership", self.store.set_membership(word, desired))
    }
}
