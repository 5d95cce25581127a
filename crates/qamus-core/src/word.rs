//! The linguistic record shared by dictionary entries and saved words.
//!
//! A [`Word`] is what search returns and what the user saves; the two
//! tables differ in column naming but carry the same fields. Every optional
//! text field is an empty string when absent, never `None`, which matches
//! how the saved-word table stores them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::WordId;

/// Dialect tag carried by every word.
///
/// The bundled dataset is a single-dialect lexicon, so search stamps
/// `Palestinian` on every entry regardless of the row contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dialect {
    #[default]
    Palestinian,
}

impl Dialect {
    /// Every dialect the dictionary carries.
    pub const ALL: [Dialect; 1] = [Dialect::Palestinian];

    /// Stored text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Palestinian => "Palestinian",
        }
    }

    /// Parses a stored dialect column. Unknown values fall back to the
    /// default dialect since there is only one.
    pub fn parse_lossy(s: &str) -> Dialect {
        match s {
            "Palestinian" => Dialect::Palestinian,
            _ => Dialect::default(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lexical form with its gloss, transliteration and morphology.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Word {
    pub id: WordId,
    /// Surface form (`FORM`).
    pub term: String,
    /// English gloss (`GLOSS`).
    pub definition: String,
    /// CAPHI++ transliteration.
    pub transliteration: String,
    pub dialect: Dialect,
    pub example_sentence: String,
    pub example_sentence_translation: String,
    pub original_term: String,
    pub root: String,
    pub root_ntws: String,
    pub root_1: String,
    pub lemma: String,
    /// Normalized lemma used for Arabic-script ranking.
    pub lemma_search: String,
    /// Buckwalter-transliterated lemma.
    pub lemma_bw: String,
    /// Buckwalter-transliterated form.
    pub form_bw: String,
    pub analysis: String,
    pub gloss_msa: String,
    pub notes: String,
    pub source: String,
    pub annotator: String,
}

impl Word {
    /// Creates a word with the three mandatory display fields set.
    pub fn new(
        id: WordId,
        term: impl Into<String>,
        definition: impl Into<String>,
        transliteration: impl Into<String>,
    ) -> Self {
        Word {
            id,
            term: term.into(),
            definition: definition.into(),
            transliteration: transliteration.into(),
            ..Word::default()
        }
    }
}

/// A word in the user's saved-word table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWord {
    #[serde(flatten)]
    pub word: Word,
    /// Milliseconds since the Unix epoch of the latest save.
    pub saved_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_serializes_camel_case() {
        let mut word = Word::new(WordId(42), "بيت", "house", "bayt");
        word.lemma_search = "بيت".into();
        let json = serde_json::to_value(&word).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["lemmaSearch"], "بيت");
        assert_eq!(json["dialect"], "Palestinian");
        assert_eq!(json["exampleSentence"], "");
    }

    #[test]
    fn dialect_list_round_trips_through_text() {
        assert_eq!(Dialect::ALL, [Dialect::Palestinian]);
        for dialect in Dialect::ALL {
            assert_eq!(Dialect::parse_lossy(dialect.as_str()), dialect);
        }
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let word: Word = serde_json::from_str(r#"{"id": 5, "term": "x"}"#).unwrap();
        assert_eq!(word.id, WordId(5));
        assert_eq!(word.definition, "");
        assert_eq!(word.annotator, "");
    }

    #[test]
    fn saved_word_flattens_fields() {
        let saved = SavedWord {
            word: Word::new(WordId(1), "a", "b", "c"),
            saved_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(json["term"], "a");
        assert_eq!(json["savedAt"], 1_700_000_000_000_i64);
    }

    #[test]
    fn dialect_parse_falls_back() {
        assert_eq!(Dialect::parse_lossy("Palestinian"), Dialect::Palestinian);
        assert_eq!(Dialect::parse_lossy(""), Dialect::Palestinian);
    }
}
