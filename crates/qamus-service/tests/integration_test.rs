//! End-to-end tests for the dictionary service.
//!
//! Each test builds a small bundled dictionary in a temp directory, points
//! a fresh [`DictionaryState`] at a live path next to it, and drives the
//! public async API: provisioning -> store -> projections.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::TempDir;

use qamus_core::{CollectionId, Dialect, Word, WordId};
use qamus_service::{Config, DictionaryState, ProvisionError, ServiceError};
use qamus_storage::DictionaryHealth;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

const CREATE_DATA: &str = "CREATE TABLE data (
    ID TEXT, FORM TEXT, GLOSS TEXT, CAPHI__ TEXT, EXAMPLE_USAGE TEXT,
    ROOT TEXT, ROOT_NTWS TEXT, ROOT_1 TEXT, LEMMA TEXT, LEMMA_SEARCH TEXT,
    LEMMA_BW TEXT, FORM_BW TEXT, ANALYSIS TEXT, GLOSS_MSA TEXT, NOTES TEXT,
    SOURCE TEXT, ANNOTATOR TEXT
)";

/// Writes a bundle with a populated `data` table and returns its path.
fn write_bundle(dir: &Path) -> PathBuf {
    let path = dir.join("bundle.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(CREATE_DATA).unwrap();
    for (id, form, gloss, lemma_search) in [
        ("1", "بيت", "house", "بيت"),
        ("2", "بيوت", "houses", "بيوت"),
        ("42", "مية", "water", "مية"),
        ("43", "كتاب", "book", "كتاب"),
    ] {
        conn.execute(
            "INSERT INTO data (ID, FORM, GLOSS, LEMMA_SEARCH) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, form, gloss, lemma_search],
        )
        .unwrap();
    }
    path
}

struct Harness {
    dir: TempDir,
    live: PathBuf,
    state: DictionaryState,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let bundle = write_bundle(dir.path());
    let live = dir.path().join("data").join("arabic-dictionary.db");
    let config = Config::with_paths(&live, bundle).with_min_db_bytes(1024);
    Harness {
        state: DictionaryState::from_config(&config),
        live,
        dir,
    }
}

async fn initialized() -> Harness {
    let h = harness();
    h.state.initialize().await.unwrap();
    h
}

fn word(id: i64, term: &str, definition: &str) -> Word {
    Word::new(WordId(id), term, definition, "")
}

fn ids<T>(items: &[T], id: impl Fn(&T) -> i64) -> Vec<i64> {
    items.iter().map(id).collect()
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_initialize_copies_bundle_on_first_run() {
    let h = harness();
    assert!(!h.live.exists());

    let health = h.state.initialize().await.unwrap();
    assert_eq!(health, DictionaryHealth::Healthy { rows: 4 });
    assert!(h.live.exists());
    assert!(h.state.saved_words().await.is_empty());
    assert!(h.state.collections().await.is_empty());
}

#[tokio::test]
async fn test_initialize_keeps_user_data_across_sessions() {
    let h = initialized().await;
    let id = h.state.create_collection("Favorites").await.unwrap();
    h.state.save_word(&word(42, "مية", "water"), &[id]).await.unwrap();

    let config = Config::with_paths(&h.live, h.dir.path().join("bundle.db"))
        .with_min_db_bytes(1024);
    let reopened = DictionaryState::from_config(&config);
    reopened.initialize().await.unwrap();
    assert_eq!(ids(&reopened.saved_words().await, |s| s.word.id.0), vec![42]);
}

#[tokio::test]
async fn test_undersized_file_is_recopied() {
    let h = harness();
    fs::create_dir_all(h.live.parent().unwrap()).unwrap();
    fs::write(&h.live, b"truncated").unwrap();

    let health = h.state.initialize().await.unwrap();
    assert!(health.is_healthy());
    assert!(fs::metadata(&h.live).unwrap().len() >= 1024);
}

#[tokio::test]
async fn test_missing_dictionary_table_triggers_reset() {
    let h = harness();
    fs::create_dir_all(h.live.parent().unwrap()).unwrap();
    {
        let conn = Connection::open(&h.live).unwrap();
        conn.execute_batch("CREATE TABLE unrelated (x TEXT); INSERT INTO unrelated VALUES ('pad');")
            .unwrap();
    }

    let health = h.state.initialize().await.unwrap();
    assert_eq!(health, DictionaryHealth::Healthy { rows: 4 });
    assert_eq!(ids(&h.state.search("house").await, |w| w.id.0), vec![1, 2]);
}

#[tokio::test]
async fn test_empty_dictionary_table_triggers_reset() {
    let h = harness();
    fs::create_dir_all(h.live.parent().unwrap()).unwrap();
    {
        let conn = Connection::open(&h.live).unwrap();
        conn.execute_batch(CREATE_DATA).unwrap();
    }

    let health = h.state.initialize().await.unwrap();
    assert_eq!(health, DictionaryHealth::Healthy { rows: 4 });
}

#[tokio::test]
async fn test_missing_bundle_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_paths(dir.path().join("live.db"), dir.path().join("absent.db"));
    let state = DictionaryState::from_config(&config);

    let err = state.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Provisioning(ProvisionError::BundleMissing(_))
    ));
}

#[tokio::test]
async fn test_unusable_bundle_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("bundle.db");
    {
        let conn = Connection::open(&bundle).unwrap();
        conn.execute_batch(CREATE_DATA).unwrap();
    }
    let config = Config::with_paths(dir.path().join("live.db"), &bundle).with_min_db_bytes(0);
    let state = DictionaryState::from_config(&config);

    let err = state.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Provisioning(ProvisionError::UnusableBundle(_))
    ));
}

#[tokio::test]
async fn test_reset_discards_user_data() {
    let h = initialized().await;
    let id = h.state.create_collection("Favorites").await.unwrap();
    h.state.save_word(&word(42, "مية", "water"), &[id]).await.unwrap();
    h.state.search("water").await;

    h.state.reset_database().await.unwrap();

    let snapshot = h.state.snapshot().await;
    assert!(snapshot.saved_words.is_empty());
    assert!(snapshot.collections.is_empty());
    assert!(snapshot.search_results.is_empty());
    assert_eq!(ids(&h.state.search("water").await, |w| w.id.0), vec![42]);
}

// ---------------------------------------------------------------------------
// Uninitialized store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_operations_fail_before_initialize() {
    let h = harness();

    assert!(matches!(
        h.state.load_saved_words().await,
        Err(ServiceError::NotInitialized)
    ));
    assert!(matches!(
        h.state.create_collection("Favorites").await,
        Err(ServiceError::NotInitialized)
    ));
    assert!(matches!(
        h.state.save_word(&word(1, "بيت", "house"), &[CollectionId(1)]).await,
        Err(ServiceError::NotInitialized)
    ));
    assert!(h.state.search("house").await.is_empty());
}

// ---------------------------------------------------------------------------
// Search, saved words and collections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_caches_results() {
    let h = initialized().await;
    let results = h.state.search("بيت").await;
    assert_eq!(ids(&results, |w| w.id.0), vec![1]);
    assert_eq!(h.state.search_results().await, results);

    assert!(h.state.search("   ").await.is_empty());
    assert!(h.state.search_results().await.is_empty());
}

#[tokio::test]
async fn test_lookup_returns_dictionary_entry() {
    let h = initialized().await;
    let entry = h.state.lookup(WordId(43)).await.unwrap().unwrap();
    assert_eq!(entry.definition, "book");
    assert!(h.state.lookup(WordId(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_collection_twice_returns_same_id() {
    let h = initialized().await;
    let first = h.state.create_collection("Favorites").await.unwrap();
    let second = h.state.create_collection("Favorites").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.state.collections().await.len(), 1);
}

#[tokio::test]
async fn test_favorites_end_to_end() {
    let h = initialized().await;
    let favorites = h.state.create_collection("Favorites").await.unwrap();
    assert_eq!(favorites, CollectionId(1));

    let water = word(42, "مية", "water");
    let change = h.state.save_word(&water, &[favorites]).await.unwrap();
    assert!(change.added.contains(&favorites));
    assert!(h.state.is_word_saved(WordId(42)).await);

    let members = h.state.words_in_collection(favorites).await.unwrap();
    assert_eq!(ids(&members, |s| s.word.id.0), vec![42]);
    assert_eq!(h.state.collections().await[0].word_count, 1);

    let change = h.state.save_word(&water, &[]).await.unwrap();
    assert!(change.deleted);
    assert!(h.state.words_in_collection(favorites).await.unwrap().is_empty());
    assert!(!h.state.is_word_saved(WordId(42)).await);
    assert!(h.state.load_saved_words().await.unwrap().is_empty());
    assert_eq!(h.state.collections().await[0].word_count, 0);
}

#[tokio::test]
async fn test_set_membership_moves_between_collections() {
    let h = initialized().await;
    let a = h.state.create_collection("A").await.unwrap();
    let b = h.state.create_collection("B").await.unwrap();
    let c = h.state.create_collection("C").await.unwrap();
    let house = word(1, "بيت", "house");

    h.state.save_word(&house, &[a, b]).await.unwrap();
    let change = h.state.save_word(&house, &[a, c]).await.unwrap();
    assert_eq!(change.added.iter().copied().collect::<Vec<_>>(), vec![c]);
    assert_eq!(change.removed.iter().copied().collect::<Vec<_>>(), vec![b]);

    let mut names: Vec<String> = h
        .state
        .collections_for_word(WordId(1))
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["A", "C"]);
}

#[tokio::test]
async fn test_delete_collection_keeps_other_data() {
    let h = initialized().await;
    let a = h.state.create_collection("A").await.unwrap();
    let b = h.state.create_collection("B").await.unwrap();
    h.state.save_word(&word(1, "بيت", "house"), &[a]).await.unwrap();
    h.state.save_word(&word(2, "بيوت", "houses"), &[b]).await.unwrap();

    h.state.delete_collection(a).await.unwrap();

    let collections = h.state.collections().await;
    assert_eq!(ids(&collections, |c| c.id.0), vec![b.0]);
    let mut saved = ids(&h.state.saved_words().await, |s| s.word.id.0);
    saved.sort();
    assert_eq!(saved, vec![1, 2]);
    assert!(h.state.collections_for_word(WordId(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rename_collection_conflicts_and_missing() {
    let h = initialized().await;
    let a = h.state.create_collection("A").await.unwrap();
    h.state.create_collection("B").await.unwrap();

    h.state.rename_collection(a, "Animals").await.unwrap();
    assert!(h.state.collections().await.iter().any(|c| c.name == "Animals"));

    assert!(matches!(
        h.state.rename_collection(a, "B").await,
        Err(ServiceError::Conflict(_))
    ));
    assert!(matches!(
        h.state.rename_collection(CollectionId(99), "Z").await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        h.state.create_collection("  ").await,
        Err(ServiceError::BadRequest(_))
    ));
}

#[tokio::test]
async fn test_membership_requires_saved_word() {
    let h = initialized().await;
    let a = h.state.create_collection("A").await.unwrap();
    assert!(matches!(
        h.state.add_membership(WordId(7), a).await,
        Err(ServiceError::Conflict(_))
    ));

    h.state.save_word(&word(1, "بيت", "house"), &[a]).await.unwrap();
    let b = h.state.create_collection("B").await.unwrap();
    h.state.add_membership(WordId(1), b).await.unwrap();
    h.state.add_membership(WordId(1), b).await.unwrap();
    h.state.remove_membership(WordId(1), a).await.unwrap();
    h.state.remove_membership(WordId(1), a).await.unwrap();

    let ids_for_word = ids(
        &h.state.collections_for_word(WordId(1)).await.unwrap(),
        |c| c.id.0,
    );
    assert_eq!(ids_for_word, vec![b.0]);
}

#[tokio::test]
async fn test_unknown_collection_leaves_word_unsaved() {
    let h = initialized().await;
    let a = h.state.create_collection("A").await.unwrap();

    assert!(matches!(
        h.state.save_word(&word(1, "بيت", "house"), &[a, CollectionId(999)]).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(!h.state.is_word_saved(WordId(1)).await);
    assert!(h.state.saved_words().await.is_empty());
    assert_eq!(h.state.collections().await[0].word_count, 0);
}

#[tokio::test]
async fn test_removing_last_membership_unsaves_word() {
    let h = initialized().await;
    let a = h.state.create_collection("A").await.unwrap();
    h.state.save_word(&word(1, "بيت", "house"), &[a]).await.unwrap();
    assert!(h.state.is_word_saved(WordId(1)).await);

    h.state.remove_membership(WordId(1), a).await.unwrap();
    assert!(!h.state.is_word_saved(WordId(1)).await);
    assert!(h.state.load_saved_words().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bundle_user_version_does_not_block_user_tables() {
    for version in [1, 3] {
        let h = harness();
        let bundle = h.dir.path().join("bundle.db");
        Connection::open(&bundle)
            .unwrap()
            .pragma_update(None, "user_version", version)
            .unwrap();

        h.state.initialize().await.unwrap();
        let id = h.state.create_collection("Favorites").await.unwrap();
        h.state.save_word(&word(42, "مية", "water"), &[id]).await.unwrap();
        assert_eq!(ids(&h.state.saved_words().await, |s| s.word.id.0), vec![42]);
    }
}

#[tokio::test]
async fn test_dialects_lists_palestinian() {
    let h = initialized().await;
    assert_eq!(h.state.dialects(), &[Dialect::Palestinian]);
    let results = h.state.search("house").await;
    assert!(results.iter().all(|w| h.state.dialects().contains(&w.dialect)));
}

#[tokio::test]
async fn test_shared_state_across_clones() {
    let h = initialized().await;
    let other = h.state.clone();
    let handle = tokio::spawn(async move { other.create_collection("Shared").await });
    let id = handle.await.unwrap().unwrap();
    assert_eq!(h.state.collections().await[0].id, id);
}
