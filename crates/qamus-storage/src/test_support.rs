//! Shared fixtures for unit tests.

use rusqlite::Connection;

use qamus_core::Word;

/// Legacy-shaped dictionary table: upper-case columns, TEXT IDs.
pub const CREATE_DICTIONARY_TABLE: &str = "CREATE TABLE data (
    ID TEXT, FORM TEXT, GLOSS TEXT, CAPHI__ TEXT, EXAMPLE_USAGE TEXT,
    ROOT TEXT, ROOT_NTWS TEXT, ROOT_1 TEXT, LEMMA TEXT, LEMMA_SEARCH TEXT,
    LEMMA_BW TEXT, FORM_BW TEXT, ANALYSIS TEXT, GLOSS_MSA TEXT, NOTES TEXT,
    SOURCE TEXT, ANNOTATOR TEXT
)";

/// (ID, FORM, GLOSS, CAPHI__, ROOT, LEMMA, LEMMA_SEARCH, GLOSS_MSA)
pub const ENTRIES: &[(&str, &str, &str, &str, &str, &str, &str, &str)] = &[
    ("1", "بيت", "house", "bayt", "ب ي ت", "بَيْت", "بيت", "منزل"),
    ("2", "بيتي", "household", "bayti", "ب ي ت", "بَيْتِي", "بيتي", ""),
    ("3", "مبيت", "greenhouse", "mabiit", "ب ي ت", "مَبِيت", "مبيت", ""),
    ("4", "بيوت", "houses", "byuut", "ب ي ت", "بُيُوت", "بيوت", ""),
    ("5", "دار", "a big house", "daar", "د و ر", "دار", "دار", "بيت كبير"),
    ("6", "مسكن", "dwelling", "maskan", "س ك ن", "مَسْكَن", "مسكن", "house"),
    ("8", "قطة", "cat", "qiTTa", "ق ط ط", "قِطَّة", "قطة", "قطة"),
    ("9", "هاوس", "House music", "haaws", "", "هاوس", "هاوس", ""),
    ("10", "أكيد", "100% sure", "akiid", "ء ك د", "أَكِيد", "اكيد", ""),
];

/// Seeds the dictionary table on an existing connection.
pub fn seed_dictionary(conn: &Connection) {
    conn.execute_batch(CREATE_DICTIONARY_TABLE).unwrap();
    let mut stmt = conn
        .prepare(
            "INSERT INTO data
                 (ID, FORM, GLOSS, CAPHI__, ROOT, LEMMA, LEMMA_SEARCH, GLOSS_MSA, SOURCE)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'fixture')",
        )
        .unwrap();
    for (id, form, gloss, caphi, root, lemma, lemma_search, gloss_msa) in ENTRIES {
        stmt.execute(rusqlite::params![
            id,
            form,
            gloss,
            caphi,
            root,
            lemma,
            lemma_search,
            gloss_msa
        ])
        .unwrap();
    }
}

/// An in-memory, migrated database with the dictionary table seeded.
pub fn fixture_conn() -> Connection {
    let conn = crate::schema::open_in_memory().unwrap();
    seed_dictionary(&conn);
    conn
}

/// IDs of a result list, in order.
pub fn ids(words: &[Word]) -> Vec<i64> {
    words.iter().map(|w| w.id.0).collect()
}
