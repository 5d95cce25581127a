//! User collections and the result of reconciling a word's membership.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::CollectionId;

/// A named grouping of saved words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Number of membership rows referencing this collection.
    pub word_count: u32,
}

/// What a membership reconciliation actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipChange {
    /// Collections the word was linked to.
    pub added: BTreeSet<CollectionId>,
    /// Collections the word was unlinked from.
    pub removed: BTreeSet<CollectionId>,
    /// True when the desired set was empty and the saved word was deleted.
    pub deleted: bool,
}

impl MembershipChange {
    /// Diffs the current membership against the desired one.
    pub fn diff(current: &BTreeSet<CollectionId>, desired: &BTreeSet<CollectionId>) -> Self {
        MembershipChange {
            added: desired.difference(current).copied().collect(),
            removed: current.difference(desired).copied().collect(),
            deleted: false,
        }
    }

    /// True when nothing needed to change.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && !self.deleted
    }
}
