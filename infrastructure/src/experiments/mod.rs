//! ExperimentRepository adapters

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileExperimentRepository;
pub use memory::InMemoryExperimentRepository;

use aeo_application::StorageError;
use aeo_domain::Experiment;

/// Replace the stored copy of `experiment` if its version still matches.
///
/// Shared by both repositories so they agree on conflict semantics.
pub(crate) fn replace_versioned(
    experiments: &mut [Experiment],
    experiment: &Experiment,
    expected_version: u64,
) -> Result<(), StorageError> {
    let stored = experiments
        .iter_mut()
        .find(|e| e.id == experiment.id)
        .ok_or_else(|| {
            StorageError::Unavailable(format!("experiment {} is not stored", experiment.id))
        })?;

    if stored.version != expected_version {
        return Err(StorageError::VersionConflict {
            id: experiment.id.to_string(),
            expected: expected_version,
            found: stored.version,
        });
    }

    *stored = experiment.clone();
    Ok(())
}

/// Newest first
pub(crate) fn sort_newest_first(experiments: &mut [Experiment]) {
    experiments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

pub(crate) fn ensure_new(experiments: &[Experiment], experiment: &Experiment) -> Result<(), StorageError> {
    if experiments.iter().any(|e| e.id == experiment.id) {
        return Err(StorageError::Unavailable(format!(
            "experiment {} already exists",
            experiment.id
        )));
    }
    Ok(())
}
