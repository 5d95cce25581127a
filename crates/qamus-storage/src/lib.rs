//! Storage layer for the qamus dictionary.
//!
//! Provides the [`LexiconStore`] trait defining the storage contract and
//! [`SqliteLexicon`], the SQLite backend over the bundled dictionary file.
//!
//! # Architecture
//!
//! One database file holds four tables:
//! - `data`: the bundled dictionary, read-only, upper-case legacy columns.
//! - `saved_words`, `collections`, `word_collections`: user data, created
//!   and migrated here, linked by `ON DELETE CASCADE` foreign keys.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`schema`]: pragmas, migrations and column backfill
//! - [`health`]: dictionary table presence/emptiness check
//! - [`rows`]: typed row mappers for each table family
//! - [`search`]: ranked substring search and single-entry lookup
//! - [`words`]: saved-word upsert, delete and listing
//! - [`collections`]: collection CRUD and membership reconciliation
//! - [`stamp`]: monotonic millisecond timestamps
//! - [`traits`]: LexiconStore trait definition
//! - [`sqlite`]: SqliteLexicon implementation

pub mod collections;
pub mod error;
pub mod health;
pub mod rows;
pub mod schema;
pub mod search;
pub mod sqlite;
pub mod stamp;
pub mod traits;
pub mod words;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use health::DictionaryHealth;
pub use search::SEARCH_LIMIT;
pub use sqlite::{SqliteLexicon, StoreHandle};
pub use traits::LexiconStore;
