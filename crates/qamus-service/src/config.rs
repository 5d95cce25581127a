//! Runtime configuration.
//!
//! Read from environment variables:
//! - `QAMUS_DB_PATH`: live database file (default: `arabic-dictionary.db`
//!   in the platform data directory)
//! - `QAMUS_BUNDLE_PATH`: bundled dictionary used to provision and reset
//!   (default: `resources/arabic-dictionary.db`)
//! - `QAMUS_MIN_DB_BYTES`: smallest plausible live database; anything
//!   smaller is treated as corrupt (default: 1000000)

use std::env;
use std::path::PathBuf;

use directories_next::ProjectDirs;

use crate::provision::ProvisionError;

/// File name of the live database inside the data directory.
pub const DB_FILE_NAME: &str = "arabic-dictionary.db";
/// Default location of the bundled dictionary.
pub const DEFAULT_BUNDLE_PATH: &str = "resources/arabic-dictionary.db";
/// The real dataset is around 8 MB; under 1 MB means a broken copy.
pub const DEFAULT_MIN_DB_BYTES: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub bundle_path: PathBuf,
    pub min_db_bytes: u64,
}

impl Config {
    /// Builds a config from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ProvisionError> {
        let db_path = match env::var_os("QAMUS_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };
        let bundle_path = env::var_os("QAMUS_BUNDLE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLE_PATH));
        let min_db_bytes = env::var("QAMUS_MIN_DB_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MIN_DB_BYTES);

        Ok(Config {
            db_path,
            bundle_path,
            min_db_bytes,
        })
    }

    /// A config with explicit paths and the default size threshold.
    pub fn with_paths(db_path: impl Into<PathBuf>, bundle_path: impl Into<PathBuf>) -> Self {
        Config {
            db_path: db_path.into(),
            bundle_path: bundle_path.into(),
            min_db_bytes: DEFAULT_MIN_DB_BYTES,
        }
    }

    pub fn with_min_db_bytes(mut self, bytes: u64) -> Self {
        self.min_db_bytes = bytes;
        self
    }
}

/// `<platform data dir>/arabic-dictionary.db`.
pub fn default_db_path() -> Result<PathBuf, ProvisionError> {
    let dirs =
        ProjectDirs::from("org", "Qamus", "qamus").ok_or(ProvisionError::DataDirUnavailable)?;
    Ok(dirs.data_dir().join(DB_FILE_NAME))
}
