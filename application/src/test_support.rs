//! Test doubles shared by the use case tests.

use crate::ports::clock::Clock;
use crate::ports::experiment_repository::ExperimentRepository;
use crate::ports::history_store::{sort_by_timestamp, HistoryQuery, HistoryStore};
use crate::ports::provider::ProviderAdapter;
use crate::ports::storage::StorageError;
use aeo_domain::{
    Experiment, ExperimentId, FailureKind, ProviderAnswer, ProviderFailure, ProviderId,
    ProviderResult, VisibilityCheck,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// What a [`ScriptedProvider`] does when asked
#[derive(Clone)]
pub enum Script {
    Answer(&'static str),
    Refuse(&'static str),
    Fail(FailureKind),
    /// Sleep, then answer
    Slow(Duration, &'static str),
    /// Cancel the batch token, then answer
    CancelThenAnswer(CancellationToken, &'static str),
    Panic,
}

pub struct ScriptedProvider {
    id: ProviderId,
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(id: &str, script: Script) -> Self {
        Self {
            id: ProviderId::new(id),
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    async fn ask(&self, _question: &str, _timeout: Duration) -> ProviderResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = Duration::from_millis(10);
        match &self.script {
            Script::Answer(text) => {
                Ok(ProviderAnswer::new(self.id.clone(), *text, latency).with_model("mock-1"))
            }
            Script::Refuse(text) => Ok(ProviderAnswer::new(self.id.clone(), *text, latency).refused()),
            Script::Fail(kind) => Err(ProviderFailure::new(self.id.clone(), *kind, "scripted failure")),
            Script::Slow(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(ProviderAnswer::new(self.id.clone(), *text, *delay))
            }
            Script::CancelThenAnswer(token, text) => {
                token.cancel();
                Ok(ProviderAnswer::new(self.id.clone(), *text, latency))
            }
            Script::Panic => panic!("scripted panic"),
        }
    }
}

#[derive(Default)]
pub struct MemoryHistory {
    checks: Mutex<Vec<VisibilityCheck>>,
    pub fail: bool,
}

impl MemoryHistory {
    pub fn failing() -> Self {
        Self {
            checks: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn len(&self) -> usize {
        self.checks.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<VisibilityCheck> {
        self.checks.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn append(&self, check: VisibilityCheck) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Unavailable("disk on fire".to_string()));
        }
        self.checks.lock().unwrap().push(check);
        Ok(())
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<VisibilityCheck>, StorageError> {
        if self.fail {
            return Err(StorageError::Unavailable("disk on fire".to_string()));
        }
        let mut found: Vec<VisibilityCheck> = self
            .checks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        sort_by_timestamp(&mut found);
        Ok(found)
    }
}

#[derive(Default)]
pub struct MemoryExperiments {
    experiments: Mutex<Vec<Experiment>>,
}

#[async_trait]
impl ExperimentRepository for MemoryExperiments {
    async fn insert(&self, experiment: &Experiment) -> Result<(), StorageError> {
        self.experiments.lock().unwrap().push(experiment.clone());
        Ok(())
    }

    async fn get(&self, id: &ExperimentId) -> Result<Option<Experiment>, StorageError> {
        Ok(self
            .experiments
            .lock()
            .unwrap()
            .iter()
            .find(|e| &e.id == id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Experiment>, StorageError> {
        Ok(self.experiments.lock().unwrap().clone())
    }

    async fn save(&self, experiment: &Experiment, expected_version: u64) -> Result<(), StorageError> {
        let mut experiments = self.experiments.lock().unwrap();
        let stored = experiments
            .iter_mut()
            .find(|e| e.id == experiment.id)
            .ok_or_else(|| StorageError::Unavailable("missing".to_string()))?;
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
}

/// Repository whose stored version moves underneath every load
#[derive(Default)]
pub struct RacingExperiments {
    pub inner: MemoryExperiments,
}

#[async_trait]
impl ExperimentRepository for RacingExperiments {
    async fn insert(&self, experiment: &Experiment) -> Result<(), StorageError> {
        self.inner.insert(experiment).await
    }

    async fn get(&self, id: &ExperimentId) -> Result<Option<Experiment>, StorageError> {
        let loaded = self.inner.get(id).await?;
        // Another writer commits right after our read
        let mut experiments = self.inner.experiments.lock().unwrap();
        if let Some(stored) = experiments.iter_mut().find(|e| &e.id == id) {
            stored.version += 1;
        }
        Ok(loaded)
    }

    async fn list(&self) -> Result<Vec<Experiment>, StorageError> {
        self.inner.list().await
    }

    async fn save(&self, experiment: &Experiment, expected_version: u64) -> Result<(), StorageError> {
        self.inner.save(experiment, expected_version).await
    }
}
