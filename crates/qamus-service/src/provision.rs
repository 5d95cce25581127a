//! Provisioning of the live database from the bundled dictionary.
//!
//! The bundle is a complete SQLite file. It is streamed into a temp file
//! next to the target and atomically persisted over it, so a crash midway
//! never leaves a half-written database at the live path.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors raised while provisioning the live database.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The platform reported no per-user data directory.
    #[error("no platform data directory available")]
    DataDirUnavailable,

    /// The bundled dictionary could not be found.
    #[error("bundled dictionary not found at {0}")]
    BundleMissing(PathBuf),

    /// A fresh copy of the bundle still had no usable dictionary table.
    #[error("bundled dictionary {0} has no usable data table")]
    UnusableBundle(String),

    /// A filesystem operation failed.
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProvisionError {
    fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> ProvisionError {
        let path = path.to_path_buf();
        move |source| ProvisionError::Io {
            action,
            path,
            source,
        }
    }
}

/// Where the bundled database bytes come from.
pub trait BundleSource: Send + Sync {
    /// Opens a fresh reader over the whole bundle.
    fn open(&self) -> Result<Box<dyn Read + Send>, ProvisionError>;

    /// Human-readable origin, for logs and errors.
    fn describe(&self) -> String;
}

/// A bundle stored as a plain file.
#[derive(Debug, Clone)]
pub struct FileBundle {
    path: PathBuf,
}

impl FileBundle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBundle { path: path.into() }
    }
}

impl BundleSource for FileBundle {
    fn open(&self) -> Result<Box<dyn Read + Send>, ProvisionError> {
        match File::open(&self.path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ProvisionError::BundleMissing(self.path.clone()))
            }
            Err(e) => Err(ProvisionError::io("open bundle", &self.path)(e)),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// State of the live database file before it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Missing,
    /// Present but below the minimum plausible size.
    Undersized { bytes: u64 },
    Present { bytes: u64 },
}

/// Copies the bundle into place and removes broken copies.
pub struct Provisioner {
    source: Box<dyn BundleSource>,
    min_db_bytes: u64,
}

impl Provisioner {
    pub fn new(source: Box<dyn BundleSource>, min_db_bytes: u64) -> Self {
        Provisioner {
            source,
            min_db_bytes,
        }
    }

    pub fn source(&self) -> &dyn BundleSource {
        self.source.as_ref()
    }

    /// Classifies the file at `path`.
    pub fn inspect(&self, path: &Path) -> Result<FileState, ProvisionError> {
        match fs::metadata(path) {
            Ok(meta) if meta.len() < self.min_db_bytes => Ok(FileState::Undersized {
                bytes: meta.len(),
            }),
            Ok(meta) => Ok(FileState::Present { bytes: meta.len() }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileState::Missing),
            Err(e) => Err(ProvisionError::io("stat", path)(e)),
        }
    }

    /// Writes a fresh copy of the bundle to `path`, replacing anything there.
    ///
    /// Returns the number of bytes written.
    pub fn install(&self, path: &Path) -> Result<u64, ProvisionError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(ProvisionError::io("create directory", dir))?;

        let mut reader = self.source.open()?;
        let mut temp =
            NamedTempFile::new_in(dir).map_err(ProvisionError::io("create temp file in", dir))?;
        let bytes =
            io::copy(&mut reader, &mut temp).map_err(ProvisionError::io("copy bundle to", path))?;
        temp.as_file()
            .sync_all()
            .map_err(ProvisionError::io("sync", temp.path()))?;

        // A journal left from the old file would be replayed into the new one.
        remove_sidecars(path)?;
        temp.persist(path)
            .map_err(|e| ProvisionError::io("persist", path)(e.error))?;

        tracing::info!(
            bundle = %self.source.describe(),
            path = %path.display(),
            bytes,
            "database copied from bundle"
        );
        Ok(bytes)
    }

    /// Deletes the database at `path` with its WAL/SHM sidecars. Missing
    /// files are not an error.
    pub fn remove(&self, path: &Path) -> Result<(), ProvisionError> {
        remove_if_exists(path)?;
        remove_sidecars(path)
    }
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn remove_sidecars(path: &Path) -> Result<(), ProvisionError> {
    remove_if_exists(&sidecar(path, "-wal"))?;
    remove_if_exists(&sidecar(path, "-shm"))
}

fn remove_if_exists(path: &Path) -> Result<(), ProvisionError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ProvisionError::io("remove", path)(e)),
    }
}
