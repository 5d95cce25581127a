//! Collections and word membership.
//!
//! Every link write is idempotent (`INSERT OR IGNORE` / unconditional
//! `DELETE`), so a reconciliation that fails halfway can be rerun without
//! duplicating or double-removing links.

use std::collections::BTreeSet;

use rusqlite::{params, Connection, Row};

use qamus_core::{Collection, CollectionId, MembershipChange, SavedWord, Word, WordId};

use crate::error::StorageError;
use crate::rows::{saved_word_row, SAVED_WORD_COLUMNS};
use crate::stamp::{next_stamp, StampColumn};
use crate::words;

const COLLECTION_COLUMNS: &str = "c.id, c.name, c.created_at, \
     (SELECT COUNT(*) FROM word_collections n WHERE n.collection_id = c.id)";

fn collection_row(row: &Row<'_>) -> rusqlite::Result<Collection> {
    Ok(Collection {
        id: CollectionId(row.get(0)?),
        name: row.get(1)?,
        created_at: row.get(2)?,
        word_count: row.get(3)?,
    })
}

fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.trim().is_empty() {
        return Err(StorageError::InvalidCollectionName);
    }
    Ok(())
}

/// Creates a collection, or returns the ID of the one already named `name`.
pub fn create(conn: &Connection, name: &str) -> Result<CollectionId, StorageError> {
    validate_name(name)?;
    let created_at = next_stamp(conn, StampColumn::CreatedAt)?;
    conn.execute(
        "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
        params![name, created_at],
    )?;
    let id: i64 = conn.query_row(
        "SELECT id FROM collections WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(CollectionId(id))
}

/// Renames a collection.
pub fn rename(conn: &Connection, id: CollectionId, name: &str) -> Result<(), StorageError> {
    validate_name(name)?;
    let changed = conn
        .execute(
            "UPDATE collections SET name = ?1 WHERE id = ?2",
            params![name, id.0],
        )
        .map_err(|e| {
            if StorageError::is_unique_violation(&e) {
                StorageError::DuplicateCollectionName(name.to_string())
            } else {
                StorageError::Database(e)
            }
        })?;
    if changed == 0 {
        return Err(StorageError::CollectionNotFound(id.0));
    }
    Ok(())
}

/// Deletes a collection and, through the foreign key, its memberships.
pub fn delete(conn: &Connection, id: CollectionId) -> Result<(), StorageError> {
    conn.execute("DELETE FROM collections WHERE id = ?1", params![id.0])?;
    Ok(())
}

/// All collections with their word counts, newest first.
pub fn list(conn: &Connection) -> Result<Vec<Collection>, StorageError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLLECTION_COLUMNS} FROM collections c ORDER BY c.created_at DESC, c.id DESC"
    ))?;
    let rows = stmt.query_map([], collection_row)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

/// Links a saved word to a collection. Linking twice is a no-op.
pub fn add_membership(
    conn: &Connection,
    word: WordId,
    collection: CollectionId,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR IGNORE INTO word_collections (word_id, collection_id) VALUES (?1, ?2)",
        params![word.0, collection.0],
    )
    .map_err(|e| {
        if StorageError::is_foreign_key_violation(&e) {
            StorageError::IntegrityError {
                reason: format!(
                    "cannot link word {word} to collection {collection}: one of them does not exist"
                ),
            }
        } else {
            StorageError::Database(e)
        }
    })?;
    Ok(())
}

/// Unlinks a saved word from a collection. Unlinking twice is a no-op.
/// Removing the last link deletes the saved word, since a saved word with
/// no collection is not kept.
pub fn remove_membership(
    conn: &Connection,
    word: WordId,
    collection: CollectionId,
) -> Result<(), StorageError> {
    let removed = conn.execute(
        "DELETE FROM word_collections WHERE word_id = ?1 AND collection_id = ?2",
        params![word.0, collection.0],
    )?;
    if removed > 0 && membership_ids(conn, word)?.is_empty() {
        words::delete(conn, word)?;
        tracing::debug!(%word, "last membership removed, word unsaved");
    }
    Ok(())
}

/// Whether a collection with `id` exists.
fn exists(conn: &Connection, id: CollectionId) -> Result<bool, StorageError> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM collections WHERE id = ?1)",
        params![id.0],
        |row| row.get(0),
    )?;
    Ok(found)
}

/// Saved words linked to a collection, most recently saved first.
pub fn members_of(
    conn: &Connection,
    collection: CollectionId,
) -> Result<Vec<SavedWord>, StorageError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {SAVED_WORD_COLUMNS} FROM saved_words sw
         INNER JOIN word_collections wc ON sw.id = wc.word_id
         WHERE wc.collection_id = ?1
         ORDER BY sw.saved_at DESC, sw.id DESC"
    ))?;
    let rows = stmt.query_map(params![collection.0], saved_word_row)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

/// Collections a word is linked to, newest first.
pub fn collections_of(conn: &Connection, word: WordId) -> Result<Vec<Collection>, StorageError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLLECTION_COLUMNS} FROM collections c
         INNER JOIN word_collections wc ON c.id = wc.collection_id
         WHERE wc.word_id = ?1
         ORDER BY c.created_at DESC, c.id DESC"
    ))?;
    let rows = stmt.query_map(params![word.0], collection_row)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

/// Collection IDs a word is currently linked to.
fn membership_ids(conn: &Connection, word: WordId) -> Result<BTreeSet<CollectionId>, StorageError> {
    let mut stmt =
        conn.prepare_cached("SELECT collection_id FROM word_collections WHERE word_id = ?1")?;
    let rows = stmt.query_map(params![word.0], |row| row.get::<_, i64>(0))?;
    let mut ids = BTreeSet::new();
    for row in rows {
        ids.insert(CollectionId(row?));
    }
    Ok(ids)
}

/// Makes `word`'s collection set equal to `desired`.
///
/// An empty `desired` set deletes the saved word outright, since a saved
/// word with no collection is not kept. Otherwise every desired collection
/// must exist (`CollectionNotFound` before anything is written), then the
/// word is upserted and only the difference between its current and
/// desired memberships is written in one transaction; links present in
/// both are left untouched.
pub fn set_membership(
    conn: &Connection,
    word: &Word,
    desired: &BTreeSet<CollectionId>,
) -> Result<MembershipChange, StorageError> {
    if desired.is_empty() {
        let removed = membership_ids(conn, word.id)?;
        words::delete(conn, word.id)?;
        return Ok(MembershipChange {
            added: BTreeSet::new(),
            removed,
            deleted: true,
        });
    }

    for id in desired {
        if !exists(conn, *id)? {
            return Err(StorageError::CollectionNotFound(id.0));
        }
    }

    let tx = conn.unchecked_transaction()?;
    words::save(&tx, word)?;

    let current = membership_ids(&tx, word.id)?;
    let change = MembershipChange::diff(&current, desired);
    // Additions first, so the word never passes through zero links.
    for id in &change.added {
        add_membership(&tx, word.id, *id)?;
    }
    for id in &change.removed {
        remove_membership(&tx, word.id, *id)?;
    }
    tx.commit()?;
    tracing::debug!(
        word = %word.id,
        added = change.added.len(),
        removed = change.removed.len(),
        "reconciled memberships"
    );
    Ok(change)
}
