//! JSON file experiment repository.
//!
//! The whole collection lives in one pretty-printed JSON document. Every
//! write goes to a sibling temp file first and is then renamed over the
//! original, so a crash leaves either the old or the new collection.
//! File IO runs on the blocking pool.

use super::{ensure_new, replace_versioned, sort_newest_first};
use aeo_application::{ExperimentRepository, StorageError};
use aeo_domain::{Experiment, ExperimentId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::task;
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ExperimentFile {
    #[serde(default)]
    experiments: Vec<Experiment>,
}

pub struct JsonFileExperimentRepository {
    collection: Arc<Collection>,
}

struct Collection {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileExperimentRepository {
    /// Use the collection at `path`, creating parent directories as needed.
    ///
    /// The file itself is created on the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Unavailable(format!(
                    "could not create experiment directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        debug!("Experiment file: {}", path.display());
        Ok(Self {
            collection: Arc::new(Collection {
                path: path.to_path_buf(),
                lock: Mutex::new(()),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.collection.path
    }

    /// Run `operation` under the collection lock on the blocking pool
    async fn locked<T, F>(&self, operation: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Collection) -> Result<T, StorageError> + Send + 'static,
    {
        let collection = Arc::clone(&self.collection);
        task::spawn_blocking(move || {
            let _guard = collection.lock.lock().map_err(|_| {
                StorageError::Unavailable("experiment file lock poisoned".to_string())
            })?;
            operation(&collection)
        })
        .await
        .map_err(|e| StorageError::Unavailable(format!("experiment task failed: {}", e)))?
    }
}

impl Collection {
    fn load(&self) -> Result<Vec<Experiment>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let file: ExperimentFile = serde_json::from_str(&content)
            .map_err(|e| StorageError::Corrupt(format!("{}: {}", self.path.display(), e)))?;
        Ok(file.experiments)
    }

    fn persist(&self, experiments: Vec<Experiment>) -> Result<(), StorageError> {
        let file = ExperimentFile { experiments };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| StorageError::Corrupt(format!("could not encode experiments: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl ExperimentRepository for JsonFileExperimentRepository {
    async fn insert(&self, experiment: &Experiment) -> Result<(), StorageError> {
        let experiment = experiment.clone();
        self.locked(move |collection| {
            let mut experiments = collection.load()?;
            ensure_new(&experiments, &experiment)?;
            experiments.push(experiment);
            collection.persist(experiments)
        })
        .await
    }

    async fn get(&self, id: &ExperimentId) -> Result<Option<Experiment>, StorageError> {
        let id = *id;
        self.locked(move |collection| Ok(collection.load()?.into_iter().find(|e| e.id == id)))
            .await
    }

    async fn list(&self) -> Result<Vec<Experiment>, StorageError> {
        let mut experiments = self.locked(Collection::load).await?;
        sort_newest_first(&mut experiments);
        Ok(experiments)
    }

    async fn save(&self, experiment: &Experiment, expected_version: u64) -> Result<(), StorageError> {
        let experiment = experiment.clone();
        self.locked(move |collection| {
            let mut experiments = collection.load()?;
            replace_versioned(&mut experiments, &experiment, expected_version)?;
            collection.persist(experiments)
        })
        .await
    }
}
