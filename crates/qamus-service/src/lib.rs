//! Service layer for the qamus dictionary.
//!
//! Ties the SQLite store to the bundled-dictionary provisioning step and
//! exposes one API for search, saved words and collections. This crate
//! contains the lifecycle (initialize/reset), error classification, runtime
//! configuration, and the async shared state used by front ends.

pub mod config;
pub mod error;
pub mod provision;
pub mod service;
pub mod state;

pub use config::Config;
pub use error::ServiceError;
pub use provision::{BundleSource, FileBundle, FileState, ProvisionError, Provisioner};
pub use service::LexiconService;
pub use state::{DictionaryState, Projections};
