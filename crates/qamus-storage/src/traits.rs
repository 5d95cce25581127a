//! The [`LexiconStore`] trait: the storage contract the service layer
//! programs against.
//!
//! Operations fall in four groups: lifecycle/health, dictionary search,
//! saved-word persistence, and collections with their memberships. Every
//! method fails with [`StorageError::NotInitialized`] when the backing
//! connection has not been opened, except a blank search, which never
//! reaches storage.

use std::collections::BTreeSet;

use qamus_core::{Collection, CollectionId, MembershipChange, SavedWord, Word, WordId};

use crate::error::StorageError;
use crate::health::DictionaryHealth;

/// Storage contract for the dictionary and the user's saved data.
pub trait LexiconStore {
    // -------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------

    /// Reports whether the bundled dictionary table is present and populated.
    fn dictionary_health(&self) -> Result<DictionaryHealth, StorageError>;

    // -------------------------------------------------------------------
    // Dictionary
    // -------------------------------------------------------------------

    /// Ranked substring search, at most 50 entries.
    fn search(&self, query: &str) -> Result<Vec<Word>, StorageError>;

    /// One dictionary entry by ID.
    fn lookup(&self, id: WordId) -> Result<Option<Word>, StorageError>;

    // -------------------------------------------------------------------
    // Saved words
    // -------------------------------------------------------------------

    /// Upserts a saved word, returning its new `saved_at` stamp.
    fn save_word(&mut self, word: &Word) -> Result<i64, StorageError>;

    /// Deletes a saved word and its memberships. Unknown IDs are ignored.
    fn delete_word(&mut self, id: WordId) -> Result<(), StorageError>;

    /// All saved words, most recently saved first.
    fn list_saved_words(&self) -> Result<Vec<SavedWord>, StorageError>;

    // -------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------

    /// Creates a collection or returns the existing one with that name.
    fn create_collection(&mut self, name: &str) -> Result<CollectionId, StorageError>;

    fn rename_collection(&mut self, id: CollectionId, name: &str) -> Result<(), StorageError>;

    /// Deletes a collection; its memberships cascade.
    fn delete_collection(&mut self, id: CollectionId) -> Result<(), StorageError>;

    /// All collections with word counts, newest first.
    fn list_collections(&self) -> Result<Vec<Collection>, StorageError>;

    // -------------------------------------------------------------------
    // Membership
    // -------------------------------------------------------------------

    fn add_membership(&mut self, word: WordId, collection: CollectionId)
        -> Result<(), StorageError>;

    fn remove_membership(
        &mut self,
        word: WordId,
        collection: CollectionId,
    ) -> Result<(), StorageError>;

    fn collections_for_word(&self, word: WordId) -> Result<Vec<Collection>, StorageError>;

    fn words_in_collection(&self, collection: CollectionId)
        -> Result<Vec<SavedWord>, StorageError>;

    /// Reconciles `word`'s memberships to exactly `desired`, deleting the
    /// saved word when `desired` is empty.
    fn set_membership(
        &mut self,
        word: &Word,
        desired: &BTreeSet<CollectionId>,
    ) -> Result<MembershipChange, StorageError>;
}
