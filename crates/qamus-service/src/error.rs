//! Service error types.
//!
//! [`ServiceError`] is the unified error type callers of the service layer
//! see. Storage errors are classified into the same coarse classes the UI
//! reacts to: not initialized, not found, conflict, bad input, provisioning
//! failure, or an internal fault.

use crate::provision::ProvisionError;

/// Errors surfaced by [`LexiconService`](crate::service::LexiconService)
/// and [`DictionaryState`](crate::state::DictionaryState).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The store has not been opened yet.
    #[error("database not initialized")]
    NotInitialized,

    /// Entity not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request conflicts with existing data.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Invalid request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Copying or validating the bundled dictionary failed.
    #[error("provisioning failed: {0}")]
    Provisioning(#[from] ProvisionError),

    /// Internal storage failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<qamus_storage::StorageError> for ServiceError {
    fn from(err: qamus_storage::StorageError) -> Self {
        use qamus_storage::StorageError;
        match &err {
            StorageError::NotInitialized => ServiceError::NotInitialized,
            StorageError::CollectionNotFound(_) => ServiceError::NotFound(err.to_string()),
            StorageError::DuplicateCollectionName(_) | StorageError::IntegrityError { .. } => {
                ServiceError::Conflict(err.to_string())
            }
            StorageError::InvalidCollectionName => ServiceError::BadRequest(err.to_string()),
            StorageError::Database(_) | StorageError::Migration(_) => {
                ServiceError::Internal(err.to_string())
            }
        }
    }
}
