//! Storage errors shared by the persistence ports

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in a storage adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),

    #[error("Record {id} was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        id: String,
        expected: u64,
        found: u64,
    },
}

impl StorageError {
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, StorageError::VersionConflict { .. })
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

/// Run a storage operation under a deadline.
///
/// A miss is reported as [`StorageError::Timeout`].
pub async fn bounded<T, F>(timeout: Duration, operation: F) -> Result<T, StorageError>
where
    F: Future<Output = Result<T, StorageError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(timeout)),
    }
}
