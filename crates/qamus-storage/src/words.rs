//! Saved-word persistence.
//!
//! Saving is an upsert that overwrites every field and restamps `saved_at`.
//! It updates in place rather than `INSERT OR REPLACE`, which would delete
//! the old row first and cascade away its collection memberships.

use rusqlite::{params, Connection, OptionalExtension};

use qamus_core::{SavedWord, Word, WordId};

use crate::error::StorageError;
use crate::rows::{saved_word_row, SAVED_WORD_COLUMNS};
use crate::stamp::{next_stamp, StampColumn};

/// Inserts or fully overwrites the saved copy of `word`.
///
/// Returns the new `saved_at` stamp.
pub fn save(conn: &Connection, word: &Word) -> Result<i64, StorageError> {
    let saved_at = next_stamp(conn, StampColumn::SavedAt)?;
    conn.execute(
        "INSERT INTO saved_words (
             id, term, definition, transliteration, dialect, example_sentence,
             example_sentence_translation, original_term, root, root_ntws, root_1,
             lemma, lemma_search, lemma_bw, form_bw, analysis, gloss_msa, notes,
             source, annotator, saved_at
         ) VALUES (
             ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
             ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21
         )
         ON CONFLICT(id) DO UPDATE SET
             term = excluded.term,
             definition = excluded.definition,
             transliteration = excluded.transliteration,
             dialect = excluded.dialect,
             example_sentence = excluded.example_sentence,
             example_sentence_translation = excluded.example_sentence_translation,
             original_term = excluded.original_term,
             root = excluded.root,
             root_ntws = excluded.root_ntws,
             root_1 = excluded.root_1,
             lemma = excluded.lemma,
             lemma_search = excluded.lemma_search,
             lemma_bw = excluded.lemma_bw,
             form_bw = excluded.form_bw,
             analysis = excluded.analysis,
             gloss_msa = excluded.gloss_msa,
             notes = excluded.notes,
             source = excluded.source,
             annotator = excluded.annotator,
             saved_at = excluded.saved_at",
        params![
            word.id.0,
            word.term,
            word.definition,
            word.transliteration,
            word.dialect.as_str(),
            word.example_sentence,
            word.example_sentence_translation,
            word.original_term,
            word.root,
            word.root_ntws,
            word.root_1,
            word.lemma,
            word.lemma_search,
            word.lemma_bw,
            word.form_bw,
            word.analysis,
            word.gloss_msa,
            word.notes,
            word.source,
            word.annotator,
            saved_at,
        ],
    )?;
    Ok(saved_at)
}

/// Deletes a saved word. Its memberships go with it via the foreign key.
/// Deleting an unknown ID is not an error.
pub fn delete(conn: &Connection, id: WordId) -> Result<(), StorageError> {
    conn.execute("DELETE FROM saved_words WHERE id = ?1", params![id.0])?;
    Ok(())
}

/// All saved words, most recently saved first.
pub fn list_saved(conn: &Connection) -> Result<Vec<SavedWord>, StorageError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {SAVED_WORD_COLUMNS} FROM saved_words sw ORDER BY sw.saved_at DESC, sw.id DESC"
    ))?;
    let rows = stmt.query_map([], saved_word_row)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

/// A single saved word by ID.
pub fn get_saved(conn: &Connection, id: WordId) -> Result<Option<SavedWord>, StorageError> {
    let word = conn
        .query_row(
            &format!("SELECT {SAVED_WORD_COLUMNS} FROM saved_words sw WHERE sw.id = ?1"),
            params![id.0],
            saved_word_row,
        )
        .optional()?;
    Ok(word)
}
