//! Experiment manager use case
//!
//! Owns experiment lifecycle transitions, report generation and the
//! per-period check runs. Every transition is a read-modify-write guarded by
//! the repository's version check, so two concurrent "stop control" requests
//! cannot both succeed.

use crate::config::ExperimentPolicy;
use crate::ports::clock::Clock;
use crate::ports::experiment_repository::ExperimentRepository;
use crate::ports::history_store::{HistoryQuery, HistoryStore, TimeRange};
use crate::ports::progress::CheckProgressNotifier;
use crate::ports::storage::{bounded, StorageError};
use crate::use_cases::run_check::{record_batch, CheckBatch, RunCheckError, RunCheckInput, RunCheckUseCase};
use aeo_domain::{
    Brand, ComparisonReport, DomainError, Experiment, ExperimentAction, ExperimentId,
    ExperimentState, PeriodTag, Question,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while managing experiments
#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("Experiment not found: {0}")]
    NotFound(ExperimentId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Check failed: {0}")]
    Check(#[from] RunCheckError),
}

impl ExperimentError {
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, ExperimentError::Domain(e) if e.is_state_conflict())
    }
}

/// Input for creating an experiment
#[derive(Debug, Clone)]
pub struct CreateExperimentInput {
    pub name: String,
    pub brand: Brand,
    pub hypothesis: String,
    pub questions: Vec<Question>,
    pub description: Option<String>,
}

impl CreateExperimentInput {
    pub fn new(
        name: impl Into<String>,
        brand: Brand,
        hypothesis: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            name: name.into(),
            brand,
            hypothesis: hypothesis.into(),
            questions,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Result of a transition; stopping the test period also yields the report
#[derive(Debug, Clone, Serialize)]
pub struct AdvanceOutcome {
    pub experiment: Experiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ComparisonReport>,
    /// Why the report is missing after a committed StopTest; rebuild it with `build_report`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_error: Option<String>,
}

/// Snapshot of an experiment's progress
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentStatus {
    pub experiment: Experiment,
    /// Period currently collecting checks
    pub period: Option<PeriodTag>,
    /// Whole seconds spent in the current period
    pub elapsed_secs: Option<i64>,
    /// Whole seconds between control end and test start
    pub dormant_gap_secs: Option<i64>,
}

impl ExperimentStatus {
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed_secs.map(Duration::seconds)
    }
}

/// Outcome of running checks for every target question of an experiment
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentRunOutcome {
    pub experiment_id: ExperimentId,
    pub period: PeriodTag,
    pub batches: Vec<CheckBatch>,
    pub recorded: usize,
    pub cancelled: bool,
}

/// Use case owning experiment lifecycle and reporting
pub struct ExperimentManager {
    repository: Arc<dyn ExperimentRepository>,
    history: Arc<dyn HistoryStore>,
    clock: Arc<dyn Clock>,
    policy: ExperimentPolicy,
}

impl ExperimentManager {
    pub fn new(
        repository: Arc<dyn ExperimentRepository>,
        history: Arc<dyn HistoryStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            history,
            clock,
            policy: ExperimentPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExperimentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create a draft experiment
    pub async fn create(&self, input: CreateExperimentInput) -> Result<Experiment, ExperimentError> {
        let mut experiment = Experiment::new(
            input.name,
            input.brand,
            input.hypothesis,
            input.questions,
            self.clock.now(),
        )?;
        if let Some(description) = input.description {
            experiment = experiment.with_description(description);
        }

        bounded(self.policy.storage_timeout, self.repository.insert(&experiment)).await?;
        info!(
            "Created experiment {} '{}' with {} questions",
            experiment.id,
            experiment.name,
            experiment.questions.len()
        );
        Ok(experiment)
    }

    pub async fn get(&self, id: &ExperimentId) -> Result<Experiment, ExperimentError> {
        bounded(self.policy.storage_timeout, self.repository.get(id))
            .await?
            .ok_or(ExperimentError::NotFound(*id))
    }

    pub async fn list(&self) -> Result<Vec<Experiment>, ExperimentError> {
        Ok(bounded(self.policy.storage_timeout, self.repository.list()).await?)
    }

    /// Apply one lifecycle transition.
    ///
    /// Stopping the test period generates the comparison report.
    pub async fn advance(
        &self,
        id: &ExperimentId,
        action: ExperimentAction,
    ) -> Result<AdvanceOutcome, ExperimentError> {
        let mut experiment = self.get(id).await?;
        let expected_version = experiment.version;
        let action_name = action.as_str();
        let from = experiment.state.as_str();

        experiment.apply(action.clone(), self.clock.now())?;

        match bounded(
            self.policy.storage_timeout,
            self.repository.save(&experiment, expected_version),
        )
        .await
        {
            Ok(()) => {}
            Err(e) if e.is_version_conflict() => {
                warn!("Experiment {} changed during '{}': {}", id, action_name, e);
                return Err(DomainError::StateConflict {
                    action: action_name.to_string(),
                    state: from.to_string(),
                    reason: "experiment was modified concurrently".to_string(),
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            "Experiment {}: {} -> {}",
            experiment.id,
            from,
            experiment.state.as_str()
        );

        let mut outcome = AdvanceOutcome {
            experiment,
            report: None,
            report_error: None,
        };

        // The transition is already committed; a failed report must not undo it
        if matches!(action, ExperimentAction::StopTest) {
            match self.report_for(&outcome.experiment).await {
                Ok(report) => outcome.report = Some(report),
                Err(e) => {
                    warn!("Experiment {} completed but its report failed: {}", id, e);
                    outcome.report_error = Some(e.to_string());
                }
            }
        }

        Ok(outcome)
    }

    /// Recompute the comparison report from stored checks
    pub async fn build_report(&self, id: &ExperimentId) -> Result<ComparisonReport, ExperimentError> {
        let experiment = self.get(id).await?;
        self.report_for(&experiment).await
    }

    async fn report_for(&self, experiment: &Experiment) -> Result<ComparisonReport, ExperimentError> {
        let now = self.clock.now();
        let reportable = matches!(
            experiment.state,
            ExperimentState::TestRunning { .. } | ExperimentState::Completed { .. }
        );

        // Unreportable states fall through to the domain's state conflict
        let checks = match experiment.state.control_start() {
            Some(start) if reportable => {
                let end = experiment.state.test_end().unwrap_or(now).max(start);
                let query = HistoryQuery::for_brand(&experiment.brand.name)
                    .with_range(TimeRange::between(start, end));
                bounded(self.policy.storage_timeout, self.history.query(&query)).await?
            }
            _ => Vec::new(),
        };

        let report = ComparisonReport::build(experiment, &checks, &self.policy.report, now)?;
        info!(
            "Report for {}: control {} checks, test {} checks, visibility delta {:+.2}",
            experiment.id, report.control.checks, report.test.checks, report.delta.visibility_rate
        );
        Ok(report)
    }

    pub async fn status(&self, id: &ExperimentId) -> Result<ExperimentStatus, ExperimentError> {
        let experiment = self.get(id).await?;
        Ok(status_of(experiment, self.clock.now()))
    }

    /// Run the orchestrator for every target question of a running period,
    /// tag results with the period and append them to the history store.
    pub async fn run_checks(
        &self,
        id: &ExperimentId,
        runner: &RunCheckUseCase,
        progress: &dyn CheckProgressNotifier,
    ) -> Result<ExperimentRunOutcome, ExperimentError> {
        let experiment = self.get(id).await?;
        let period = current_period(&experiment.state).ok_or_else(|| DomainError::StateConflict {
            action: "run checks for".to_string(),
            state: experiment.state.as_str().to_string(),
            reason: "no period is running".to_string(),
        })?;

        let mut outcome = ExperimentRunOutcome {
            experiment_id: experiment.id,
            period,
            batches: Vec::with_capacity(experiment.questions.len()),
            recorded: 0,
            cancelled: false,
        };

        for question in &experiment.questions {
            let input = RunCheckInput::new(question.clone(), experiment.brand.clone()).with_period(period);
            let batch = runner.execute_with_progress(input, progress).await?;
            outcome.recorded +=
                record_batch(self.history.as_ref(), &batch, self.policy.storage_timeout).await?;
            let cancelled = batch.cancelled;
            outcome.batches.push(batch);
            if cancelled {
                outcome.cancelled = true;
                break;
            }
        }

        info!(
            "Recorded {} {} checks for experiment {}",
            outcome.recorded, period, experiment.id
        );
        Ok(outcome)
    }
}

fn current_period(state: &ExperimentState) -> Option<PeriodTag> {
    match state {
        ExperimentState::ControlRunning { .. } => Some(PeriodTag::Control),
        ExperimentState::TestRunning { .. } => Some(PeriodTag::Test),
        _ => None,
    }
}

fn status_of(experiment: Experiment, now: DateTime<Utc>) -> ExperimentStatus {
    ExperimentStatus {
        period: current_period(&experiment.state),
        elapsed_secs: experiment.elapsed_in_period(now).map(|d| d.num_seconds()),
        dormant_gap_secs: experiment.dormant_gap().map(|d| d.num_seconds()),
        experiment,
    }
}
