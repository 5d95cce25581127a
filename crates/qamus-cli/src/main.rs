//! Qamus dictionary CLI.
//!
//! Provides the `qamus` binary for searching the bundled Palestinian
//! Arabic dictionary and managing saved words and collections from a
//! terminal. Every command goes through the same `DictionaryState` a
//! desktop front end would use, so provisioning and recovery behave the
//! same way.
//!
//! Results are printed to stdout as JSON; logs go to stderr and are
//! filtered with `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use qamus_core::{CollectionId, WordId};
use qamus_service::{Config, DictionaryState, ServiceError};
use qamus_storage::DictionaryHealth;

/// Palestinian Arabic dictionary.
#[derive(Parser)]
#[command(name = "qamus", about = "Palestinian Arabic dictionary")]
struct Cli {
    /// Live database file (overrides QAMUS_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Bundled dictionary used to provision and reset (overrides
    /// QAMUS_BUNDLE_PATH).
    #[arg(long, global = true)]
    bundle: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search the dictionary (Arabic or English).
    Search {
        /// Text to look for.
        query: String,
    },

    /// List the dialects entries are tagged with.
    Dialects,

    /// Show one dictionary entry.
    Show {
        /// Entry ID.
        id: i64,
    },

    /// Save an entry into exactly the given collections.
    Save {
        /// Entry ID.
        id: i64,

        /// Collection IDs; repeat for several.
        #[arg(short, long = "collection", required = true)]
        collections: Vec<i64>,
    },

    /// Remove a saved word and all its memberships.
    Unsave {
        /// Entry ID.
        id: i64,
    },

    /// List saved words, newest first.
    Saved,

    /// List collections, newest first.
    Collections,

    /// Collections a saved word belongs to.
    Memberships {
        /// Entry ID.
        id: i64,
    },

    /// Manage collections.
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },

    /// Replace the database with a fresh copy of the bundle.
    Reset,

    /// Report dictionary table health.
    Check,
}

#[derive(Subcommand)]
enum CollectionAction {
    /// Create a collection, or print the id of the existing one.
    Create { name: String },
    /// Rename a collection.
    Rename { id: i64, name: String },
    /// Delete a collection; its words stay saved.
    Delete { id: i64 },
    /// Saved words in a collection.
    Words { id: i64 },
    /// Link a saved word to a collection.
    Add { word: i64, collection: i64 },
    /// Unlink a saved word from a collection.
    Remove { word: i64, collection: i64 },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthReport {
    healthy: bool,
    status: &'static str,
    rows: u64,
}

impl From<DictionaryHealth> for HealthReport {
    fn from(health: DictionaryHealth) -> Self {
        let (status, rows) = match health {
            DictionaryHealth::Healthy { rows } => ("healthy", rows),
            DictionaryHealth::MissingTable => ("missing-table", 0),
            DictionaryHealth::Empty => ("empty", 0),
        };
        HealthReport {
            healthy: health.is_healthy(),
            status,
            rows,
        }
    }
}

#[derive(Serialize)]
struct Created {
    id: CollectionId,
}

#[derive(Serialize)]
struct Done {
    ok: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    process::exit(run(cli).await);
}

/// Builds the config from the environment and command-line overrides.
fn load_config(cli: &Cli) -> Result<Config, ServiceError> {
    let mut config = Config::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(bundle) = &cli.bundle {
        config.bundle_path = bundle.clone();
    }
    Ok(config)
}

/// Execute one command.
///
/// Returns exit code: 0 = success, 1 = bad input or missing entity,
/// 2 = database could not be provisioned or opened, 3 = internal error.
async fn run(cli: Cli) -> i32 {
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => return report(&e),
    };
    tracing::debug!(
        db = %config.db_path.display(),
        bundle = %config.bundle_path.display(),
        "configuration loaded"
    );

    let state = DictionaryState::from_config(&config);
    if let Err(e) = state.initialize().await {
        return report(&e);
    }

    match execute(&state, cli.command).await {
        Ok(code) => code,
        Err(e) => report(&e),
    }
}

async fn execute(state: &DictionaryState, command: Commands) -> Result<i32, ServiceError> {
    match command {
        Commands::Search { query } => print_json(&state.search(&query).await),
        Commands::Dialects => print_json(&state.dialects()),
        Commands::Show { id } => match state.lookup(WordId(id)).await? {
            Some(word) => print_json(&word),
            None => {
                eprintln!("Error: no dictionary entry with id {}", id);
                Ok(1)
            }
        },
        Commands::Save { id, collections } => {
            let Some(word) = state.lookup(WordId(id)).await? else {
                eprintln!("Error: no dictionary entry with id {}", id);
                return Ok(1);
            };
            let ids: Vec<CollectionId> = collections.into_iter().map(CollectionId).collect();
            print_json(&state.save_word(&word, &ids).await?)
        }
        Commands::Unsave { id } => {
            state.delete_word(WordId(id)).await?;
            print_json(&Done { ok: true })
        }
        Commands::Saved => print_json(&state.saved_words().await),
        Commands::Collections => print_json(&state.collections().await),
        Commands::Memberships { id } => print_json(&state.collections_for_word(WordId(id)).await?),
        Commands::Collection { action } => execute_collection(state, action).await,
        Commands::Reset => {
            state.reset_database().await?;
            print_json(&HealthReport::from(state.dictionary_health().await?))
        }
        Commands::Check => {
            let health = state.dictionary_health().await?;
            print_json(&HealthReport::from(health))
        }
    }
}

async fn execute_collection(
    state: &DictionaryState,
    action: CollectionAction,
) -> Result<i32, ServiceError> {
    match action {
        CollectionAction::Create { name } => {
            let id = state.create_collection(&name).await?;
            print_json(&Created { id })
        }
        CollectionAction::Rename { id, name } => {
            state.rename_collection(CollectionId(id), &name).await?;
            print_json(&Done { ok: true })
        }
        CollectionAction::Delete { id } => {
            state.delete_collection(CollectionId(id)).await?;
            print_json(&Done { ok: true })
        }
        CollectionAction::Words { id } => {
            print_json(&state.words_in_collection(CollectionId(id)).await?)
        }
        CollectionAction::Add { word, collection } => {
            state
                .add_membership(WordId(word), CollectionId(collection))
                .await?;
            print_json(&Done { ok: true })
        }
        CollectionAction::Remove { word, collection } => {
            state
                .remove_membership(WordId(word), CollectionId(collection))
                .await?;
            print_json(&Done { ok: true })
        }
    }
}

/// Prints `value` as pretty JSON to stdout.
fn print_json<T: Serialize>(value: &T) -> Result<i32, ServiceError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ServiceError::Internal(format!("failed to serialize result: {}", e)))?;
    println!("{}", json);
    Ok(0)
}

/// Prints an error to stderr and maps it to an exit code.
fn report(err: &ServiceError) -> i32 {
    eprintln!("Error: {}", err);
    match err {
        ServiceError::NotFound(_) | ServiceError::Conflict(_) | ServiceError::BadRequest(_) => 1,
        ServiceError::NotInitialized | ServiceError::Provisioning(_) => 2,
        ServiceError::Internal(_) => 3,
    }
}
