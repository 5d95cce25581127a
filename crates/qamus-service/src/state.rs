//! Shared dictionary state for async callers.
//!
//! [`DictionaryState`] wraps a [`LexiconService`] and its cached
//! projections in `Arc<tokio::sync::Mutex<>>`. The projections (last search
//! results, saved words, collections) are rebuilt from the store after every
//! mutation and are never treated as a source of truth.
//!
//! `tokio::sync::Mutex` is used rather than `RwLock` because the service
//! owns a `rusqlite::Connection`, which is `!Sync`.

use std::collections::BTreeSet;
use std::sync::Arc;

use qamus_core::{Collection, CollectionId, Dialect, MembershipChange, SavedWord, Word, WordId};
use qamus_storage::DictionaryHealth;

use crate::config::Config;
use crate::error::ServiceError;
use crate::service::LexiconService;

/// In-memory copies of store contents, replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projections {
    pub search_results: Vec<Word>,
    pub saved_words: Vec<SavedWord>,
    pub collections: Vec<Collection>,
}

struct Inner {
    service: LexiconService,
    projections: Projections,
}

impl Inner {
    fn refresh_saved_words(&mut self) -> Result<(), ServiceError> {
        self.projections.saved_words = self.service.list_saved_words()?;
        Ok(())
    }

    fn refresh_collections(&mut self) -> Result<(), ServiceError> {
        self.projections.collections = self.service.list_collections()?;
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), ServiceError> {
        self.refresh_saved_words()?;
        self.refresh_collections()
    }

    /// Refreshes after a mutation whether or not it succeeded, so a write
    /// that failed partway is still reflected. The mutation's own error
    /// takes precedence over a refresh error.
    fn settle<T>(&mut self, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
        let refreshed = self.refresh();
        let value = result?;
        refreshed?;
        Ok(value)
    }
}

/// Cloneable handle to the dictionary service and its projections.
#[derive(Clone)]
pub struct DictionaryState {
    inner: Arc<tokio::sync::Mutex<Inner>>,
}

impl DictionaryState {
    pub fn new(service: LexiconService) -> Self {
        DictionaryState {
            inner: Arc::new(tokio::sync::Mutex::new(Inner {
                service,
                projections: Projections::default(),
            })),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(LexiconService::new(config))
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Opens (and if needed provisions) the database, then loads the
    /// saved-word and collection projections.
    pub async fn initialize(&self) -> Result<DictionaryHealth, ServiceError> {
        let mut inner = self.inner.lock().await;
        let health = inner.service.initialize()?;
        inner.refresh()?;
        Ok(health)
    }

    /// Replaces the database with a fresh copy of the bundle. All user
    /// data is lost; projections are reloaded from the empty tables.
    pub async fn reset_database(&self) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        inner.service.reset_database()?;
        inner.projections.search_results.clear();
        inner.refresh()
    }

    pub async fn dictionary_health(&self) -> Result<DictionaryHealth, ServiceError> {
        self.inner.lock().await.service.dictionary_health()
    }

    // -------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------

    /// Runs a search and caches its results. Failures yield no results.
    pub async fn search(&self, query: &str) -> Vec<Word> {
        let mut inner = self.inner.lock().await;
        let results = inner.service.search(query);
        inner.projections.search_results = results.clone();
        results
    }

    pub async fn lookup(&self, id: WordId) -> Result<Option<Word>, ServiceError> {
        self.inner.lock().await.service.lookup(id)
    }

    /// Dialects a search result can carry.
    pub fn dialects(&self) -> &'static [Dialect] {
        &Dialect::ALL
    }

    // -------------------------------------------------------------------
    // Saved words
    // -------------------------------------------------------------------

    /// Saves `word` into exactly the given collections. An empty list
    /// unsaves the word.
    pub async fn save_word(
        &self,
        word: &Word,
        collections: &[CollectionId],
    ) -> Result<MembershipChange, ServiceError> {
        let desired: BTreeSet<CollectionId> = collections.iter().copied().collect();
        self.set_membership(word, &desired).await
    }

    pub async fn set_membership(
        &self,
        word: &Word,
        desired: &BTreeSet<CollectionId>,
    ) -> Result<MembershipChange, ServiceError> {
        let mut inner = self.inner.lock().await;
        let result = inner.service.set_membership(word, desired);
        let change = inner.settle(result)?;
        tracing::debug!(
            word = %word.id,
            added = change.added.len(),
            removed = change.removed.len(),
            deleted = change.deleted,
            "membership updated"
        );
        Ok(change)
    }

    pub async fn delete_word(&self, id: WordId) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        let result = inner.service.delete_word(id);
        inner.settle(result)
    }

    /// Reloads and returns the saved words, newest first.
    pub async fn load_saved_words(&self) -> Result<Vec<SavedWord>, ServiceError> {
        let mut inner = self.inner.lock().await;
        inner.refresh_saved_words()?;
        Ok(inner.projections.saved_words.clone())
    }

    /// Whether `id` is in the cached saved-word list.
    pub async fn is_word_saved(&self, id: WordId) -> bool {
        let inner = self.inner.lock().await;
        inner.projections.saved_words.iter().any(|s| s.word.id == id)
    }

    // -------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------

    /// Creates a collection, or returns the id of the one already named
    /// `name`.
    pub async fn create_collection(&self, name: &str) -> Result<CollectionId, ServiceError> {
        let mut inner = self.inner.lock().await;
        let id = inner.service.create_collection(name)?;
        inner.refresh_collections()?;
        Ok(id)
    }

    pub async fn rename_collection(
        &self,
        id: CollectionId,
        name: &str,
    ) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        inner.service.rename_collection(id, name)?;
        inner.refresh_collections()
    }

    pub async fn delete_collection(&self, id: CollectionId) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        let result = inner.service.delete_collection(id);
        inner.settle(result)
    }

    /// Reloads and returns the collections, newest first.
    pub async fn load_collections(&self) -> Result<Vec<Collection>, ServiceError> {
        let mut inner = self.inner.lock().await;
        inner.refresh_collections()?;
        Ok(inner.projections.collections.clone())
    }

    pub async fn add_membership(
        &self,
        word: WordId,
        collection: CollectionId,
    ) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        let result = inner.service.add_membership(word, collection);
        inner.settle(result)
    }

    pub async fn remove_membership(
        &self,
        word: WordId,
        collection: CollectionId,
    ) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        let result = inner.service.remove_membership(word, collection);
        inner.settle(result)
    }

    pub async fn collections_for_word(
        &self,
        word: WordId,
    ) -> Result<Vec<Collection>, ServiceError> {
        self.inner.lock().await.service.collections_for_word(word)
    }

    pub async fn words_in_collection(
        &self,
        collection: CollectionId,
    ) -> Result<Vec<SavedWord>, ServiceError> {
        self.inner.lock().await.service.words_in_collection(collection)
    }

    // -------------------------------------------------------------------
    // Projections
    // -------------------------------------------------------------------

    pub async fn search_results(&self) -> Vec<Word> {
        self.inner.lock().await.projections.search_results.clone()
    }

    pub async fn saved_words(&self) -> Vec<SavedWord> {
        self.inner.lock().await.projections.saved_words.clone()
    }

    pub async fn collections(&self) -> Vec<Collection> {
        self.inner.lock().await.projections.collections.clone()
    }

    pub async fn snapshot(&self) -> Projections {
        self.inner.lock().await.projections.clone()
    }
}
