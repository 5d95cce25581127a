//! Stable ID newtypes for lexicon entities.
//!
//! Both IDs wrap `i64` so they line up with SQLite's `INTEGER PRIMARY KEY`,
//! and are distinct types so a `WordId` cannot be passed where a
//! `CollectionId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a dictionary entry, shared by the saved-word table.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WordId(pub i64);

/// Identifier of a user collection. Assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub i64);

// Display implementations -- just print the inner value.

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for WordId {
    fn from(raw: i64) -> Self {
        WordId(raw)
    }
}

impl From<i64> for CollectionId {
    fn from(raw: i64) -> Self {
        CollectionId(raw)
    }
}
