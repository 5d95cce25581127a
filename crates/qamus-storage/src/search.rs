//! Substring search over the bundled dictionary table.
//!
//! A row matches when any of [`SEARCHABLE_COLUMNS`] contains the query.
//! Matches are ordered by a four-key ranking against one script-dependent
//! column (see [`ranking_column`]): exact match, prefix match, substring
//! match, then shorter values first. Ties keep table order.
//!
//! Matching uses SQLite's `LIKE`, which folds ASCII case only; the exact
//! match key uses `=` and is case-sensitive. The query's `%`, `_` and `\`
//! are escaped so the test is a literal substring test.

use rusqlite::{params, Connection, OptionalExtension};

use qamus_core::{Script, Word, WordId};

use crate::error::StorageError;
use crate::rows::{dictionary_row, DictionaryLayout};
use crate::schema::DICTIONARY_TABLE;

/// Maximum number of rows a search returns.
pub const SEARCH_LIMIT: usize = 50;

/// Dictionary columns a query is matched against.
pub const SEARCHABLE_COLUMNS: [&str; 7] = [
    "FORM",
    "GLOSS",
    "CAPHI__",
    "ROOT",
    "LEMMA",
    "LEMMA_SEARCH",
    "GLOSS_MSA",
];

/// Column the ranking keys are computed against for a query script.
pub fn ranking_column(script: Script) -> &'static str {
    match script {
        Script::Arabic => "LEMMA_SEARCH",
        Script::Latin => "GLOSS",
    }
}

/// The three match patterns derived from one raw query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPatterns {
    /// The query as typed, compared with `=`.
    pub exact: String,
    /// `query%`, with LIKE metacharacters escaped.
    pub prefix: String,
    /// `%query%`, with LIKE metacharacters escaped.
    pub contains: String,
}

impl SearchPatterns {
    pub fn new(query: &str) -> Self {
        let escaped = escape_like(query);
        SearchPatterns {
            exact: query.to_string(),
            prefix: format!("{escaped}%"),
            contains: format!("%{escaped}%"),
        }
    }
}

/// Escapes `\`, `%` and `_` for use in `LIKE ... ESCAPE '\'`.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Builds the ranked search statement for `script` over the columns
/// `layout` reports. Searchable columns the bundle lacks are left out of
/// the filter; a missing ranking column ranks every row alike.
///
/// Parameters: `?1` contains pattern, `?2` exact query, `?3` prefix
/// pattern, `?4` row limit.
pub fn search_sql(layout: &DictionaryLayout, script: Script) -> String {
    let rank = layout.expr(ranking_column(script));
    let filter = SEARCHABLE_COLUMNS
        .iter()
        .filter(|column| layout.has(column))
        .map(|column| format!(r"{column} LIKE ?1 ESCAPE '\'"))
        .collect::<Vec<_>>();
    let filter = if filter.is_empty() {
        "0".to_string()
    } else {
        filter.join(" OR ")
    };
    let select = layout.select_list();
    format!(
        r"SELECT {select} FROM {DICTIONARY_TABLE}
          WHERE {filter}
          ORDER BY
            CASE WHEN {rank} = ?2 THEN 0 ELSE 1 END,
            CASE WHEN {rank} LIKE ?3 ESCAPE '\' THEN 0 ELSE 1 END,
            CASE WHEN {rank} LIKE ?1 ESCAPE '\' THEN 0 ELSE 1 END,
            LENGTH({rank}) ASC,
            rowid ASC
          LIMIT ?4"
    )
}

/// Runs a ranked substring search.
///
/// Blank queries return an empty list without touching `conn`.
pub fn search(conn: &Connection, query: &str) -> Result<Vec<Word>, StorageError> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let script = Script::detect(query);
    let patterns = SearchPatterns::new(query);
    tracing::debug!(?script, ?patterns, "searching dictionary");

    let layout = DictionaryLayout::load(conn)?;
    let mut stmt = conn.prepare_cached(&search_sql(&layout, script))?;
    let rows = stmt.query_map(
        params![
            patterns.contains,
            patterns.exact,
            patterns.prefix,
            SEARCH_LIMIT as i64
        ],
        dictionary_row,
    )?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }

    tracing::debug!(count = result.len(), "search complete");
    Ok(result)
}

/// Fetches a single dictionary entry. IDs are compared numerically so
/// TEXT-typed ID columns still match.
pub fn lookup(conn: &Connection, id: WordId) -> Result<Option<Word>, StorageError> {
    let layout = DictionaryLayout::load(conn)?;
    let word = conn
        .query_row(
            &format!(
                "SELECT {} FROM {DICTIONARY_TABLE} \
                 WHERE CAST(ID AS INTEGER) = ?1 ORDER BY rowid LIMIT 1",
                layout.select_list()
            ),
            params![id.0],
            dictionary_row,
        )
        .optional()?;
    Ok(word)
}
