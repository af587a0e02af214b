//! Experiment repository port

use crate::ports::storage::StorageError;
use aeo_domain::{Experiment, ExperimentId};
use async_trait::async_trait;

/// Persistence for experiments with optimistic concurrency
///
/// `save` succeeds only if the stored version equals `expected_version`;
/// otherwise it returns [`StorageError::VersionConflict`] and stores nothing.
#[async_trait]
pub trait ExperimentRepository: Send + Sync {
    /// Store a new experiment; fails if the id already exists
    async fn insert(&self, experiment: &Experiment) -> Result<(), StorageError>;

    async fn get(&self, id: &ExperimentId) -> Result<Option<Experiment>, StorageError>;

    /// All experiments, newest first
    async fn list(&self) -> Result<Vec<Experiment>, StorageError>;

    async fn save(&self, experiment: &Experiment, expected_version: u64) -> Result<(), StorageError>;
}
