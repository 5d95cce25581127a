//! Shared data model for the qamus dictionary.
//!
//! Every other crate speaks in these types: the storage layer maps rows
//! onto them, the service caches them, and the CLI prints them as JSON.

pub mod collection;
pub mod id;
pub mod script;
pub mod word;

// Re-export commonly used types
pub use collection::{Collection, MembershipChange};
pub use id::{CollectionId, WordId};
pub use script::Script;
pub use word::{Dialect, SavedWord, Word};
