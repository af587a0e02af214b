//! In-process experiment repository

use super::{ensure_new, replace_versioned, sort_newest_first};
use aeo_application::{ExperimentRepository, StorageError};
use aeo_domain::{Experiment, ExperimentId};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct InMemoryExperimentRepository {
    experiments: Mutex<Vec<Experiment>>,
}

impl InMemoryExperimentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Experiment>>, StorageError> {
        self.experiments
            .lock()
            .map_err(|_| StorageError::Unavailable("experiment lock poisoned".to_string()))
    }
}

#[async_trait]
impl ExperimentRepository for InMemoryExperimentRepository {
    async fn insert(&self, experiment: &Experiment) -> Result<(), StorageError> {
        let mut experiments = self.lock()?;
        ensure_new(&experiments, experiment)?;
        experiments.push(experiment.clone());
        Ok(())
    }

    async fn get(&self, id: &ExperimentId) -> Result<Option<Experiment>, StorageError> {
        Ok(self.lock()?.iter().find(|e| &e.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Experiment>, StorageError> {
        let mut experiments = self.lock()?.clone();
        sort_newest_first(&mut experiments);
        Ok(experiments)
    }

    async fn save(&self, experiment: &Experiment, expected_version: u64) -> Result<(), StorageError> {
        let mut experiments = self.lock()?;
        replace_versioned(&mut experiments, experiment, expected_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeo_domain::{Brand, ExperimentAction, Question};
    use chrono::{Duration, TimeZone, Utc};

    fn experiment(name: &str, day: u32) -> Experiment {
        Experiment::new(
            name,
            Brand::new("Acme"),
            "Docs page lifts visibility",
            vec![Question::new("Best CRM?")],
            Utc.with_ymd_and_hms(2026, 3, day, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = InMemoryExperimentRepository::new();
        repo.insert(&experiment("old", 1)).await.unwrap();
        repo.insert(&experiment("new", 9)).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let repo = InMemoryExperimentRepository::new();
        let exp = experiment("a", 1);
        repo.insert(&exp).await.unwrap();
        assert!(repo.insert(&exp).await.is_err());
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let repo = InMemoryExperimentRepository::new();
        let exp = experiment("a", 1);
        repo.insert(&exp).await.unwrap();

        let mut first = repo.get(&exp.id).await.unwrap().unwrap();
        let mut second = first.clone();
        let now = exp.created_at + Duration::hours(1);

        first.apply(ExperimentAction::StartControl, now).unwrap();
        repo.save(&first, exp.version).await.unwrap();

        second.apply(ExperimentAction::Abort, now).unwrap();
        let err = repo.save(&second, exp.version).await.unwrap_err();
        assert!(err.is_version_conflict());

        let stored = repo.get(&exp.id).await.unwrap().unwrap();
        assert_eq!(stored.state.as_str(), first.state.as_str());
    }
}
