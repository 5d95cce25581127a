//! Row mapping for the two table families.
//!
//! The bundled `data` table uses upper-case legacy column names and loose
//! typing (IDs may be stored as TEXT, any column may be NULL, and older
//! bundles lack some columns entirely). The user tables use lower-case
//! names and are written only by this crate. Each family gets its own
//! column list and mapper; the mappers read by position.

use std::collections::HashSet;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};

use qamus_core::{Dialect, SavedWord, Word, WordId};

use crate::error::StorageError;
use crate::schema::{table_columns, DICTIONARY_TABLE};

/// Dictionary columns, in mapper order.
pub const DICTIONARY_COLUMNS: [&str; 17] = [
    "ID",
    "FORM",
    "GLOSS",
    "CAPHI__",
    "EXAMPLE_USAGE",
    "ROOT",
    "ROOT_NTWS",
    "ROOT_1",
    "LEMMA",
    "LEMMA_SEARCH",
    "LEMMA_BW",
    "FORM_BW",
    "ANALYSIS",
    "GLOSS_MSA",
    "NOTES",
    "SOURCE",
    "ANNOTATOR",
];

/// Which [`DICTIONARY_COLUMNS`] one bundle's `data` table actually has.
#[derive(Debug, Clone)]
pub struct DictionaryLayout {
    present: HashSet<String>,
}

impl DictionaryLayout {
    /// Reads the column list of the dictionary table on `conn`.
    pub fn load(conn: &Connection) -> Result<Self, StorageError> {
        Ok(DictionaryLayout {
            present: table_columns(conn, DICTIONARY_TABLE)?,
        })
    }

    pub fn has(&self, column: &str) -> bool {
        self.present.contains(&column.to_ascii_lowercase())
    }

    /// `column` if the table has it, else `NULL`.
    pub fn expr<'a>(&self, column: &'a str) -> &'a str {
        if self.has(column) {
            column
        } else {
            "NULL"
        }
    }

    /// Select list for [`dictionary_row`]. Missing columns read as NULL,
    /// which the mapper turns into empty strings.
    pub fn select_list(&self) -> String {
        DICTIONARY_COLUMNS
            .iter()
            .map(|column| self.expr(column))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Columns selected from `saved_words`, in mapper order.
pub const SAVED_WORD_COLUMNS: &str = "sw.id, sw.term, sw.definition, sw.transliteration, \
     sw.dialect, sw.example_sentence, sw.example_sentence_translation, sw.original_term, sw.root, \
     sw.root_ntws, sw.root_1, sw.lemma, sw.lemma_search, sw.lemma_bw, sw.form_bw, \
     sw.analysis, sw.gloss_msa, sw.notes, sw.source, sw.annotator, sw.saved_at";

/// Maps a row selected with [`DictionaryLayout::select_list`].
pub fn dictionary_row(row: &Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        id: WordId(id_column(row, 0)?),
        term: text_column(row, 1)?,
        definition: text_column(row, 2)?,
        transliteration: text_column(row, 3)?,
        dialect: Dialect::Palestinian,
        example_sentence: text_column(row, 4)?,
        example_sentence_translation: String::new(),
        original_term: String::new(),
        root: text_column(row, 5)?,
        root_ntws: text_column(row, 6)?,
        root_1: text_column(row, 7)?,
        lemma: text_column(row, 8)?,
        lemma_search: text_column(row, 9)?,
        lemma_bw: text_column(row, 10)?,
        form_bw: text_column(row, 11)?,
        analysis: text_column(row, 12)?,
        gloss_msa: text_column(row, 13)?,
        notes: text_column(row, 14)?,
        source: text_column(row, 15)?,
        annotator: text_column(row, 16)?,
    })
}

/// Maps a row selected with [`SAVED_WORD_COLUMNS`].
pub fn saved_word_row(row: &Row<'_>) -> rusqlite::Result<SavedWord> {
    let dialect: String = text_column(row, 4)?;
    let word = Word {
        id: WordId(row.get(0)?),
        term: text_column(row, 1)?,
        definition: text_column(row, 2)?,
        transliteration: text_column(row, 3)?,
        dialect: Dialect::parse_lossy(&dialect),
        example_sentence: text_column(row, 5)?,
        example_sentence_translation: text_column(row, 6)?,
        original_term: text_column(row, 7)?,
        root: text_column(row, 8)?,
        root_ntws: text_column(row, 9)?,
        root_1: text_column(row, 10)?,
        lemma: text_column(row, 11)?,
        lemma_search: text_column(row, 12)?,
        lemma_bw: text_column(row, 13)?,
        form_bw: text_column(row, 14)?,
        analysis: text_column(row, 15)?,
        gloss_msa: text_column(row, 16)?,
        notes: text_column(row, 17)?,
        source: text_column(row, 18)?,
        annotator: text_column(row, 19)?,
    };
    Ok(SavedWord {
        word,
        saved_at: row.get(20)?,
    })
}

/// Reads any column as text. NULL becomes the empty string and numbers are
/// formatted, so loosely typed bundle columns never fail the row.
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    })
}

/// Reads an identifier column, parsing TEXT. Anything unparsable is `0`.
fn id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => i,
        ValueRef::Real(f) => f as i64,
        ValueRef::Text(bytes) => parse_leading_int(&String::from_utf8_lossy(bytes)),
        ValueRef::Null | ValueRef::Blob(_) => 0,
    })
}

/// Parses the leading decimal integer of `s` ("42", " 42 ", "42abc" -> 42).
/// Returns 0 when there are no leading digits or the value overflows.
pub fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(digits.len(), |(i, _)| i);
    match digits[..end].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0,
    }
}
