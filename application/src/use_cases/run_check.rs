//! Run Check use case
//!
//! Fans one question out to every configured provider concurrently, then
//! classifies each answer into a [`VisibilityCheck`].

use crate::config::CheckParams;
use crate::ports::clock::Clock;
use crate::ports::history_store::HistoryStore;
use crate::ports::progress::{CheckProgressNotifier, NoProgress};
use crate::ports::provider::ProviderAdapter;
use crate::ports::storage::{bounded, StorageError};
use aeo_domain::{
    classify_answer, Brand, FailureKind, PeriodTag, ProviderFailure, ProviderId, ProviderResult,
    Question, VisibilityCheck,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use chrono::{DateTime, Utc};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that prevent a batch from running at all
#[derive(Error, Debug)]
pub enum RunCheckError {
    #[error("No providers configured")]
    NoProviders,

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] aeo_domain::DomainError),
}

/// Input for the RunCheck use case
#[derive(Debug, Clone)]
pub struct RunCheckInput {
    pub question: Question,
    pub brand: Brand,
    /// Experiment period the resulting checks belong to
    pub period: Option<PeriodTag>,
}

impl RunCheckInput {
    pub fn new(question: impl Into<Question>, brand: Brand) -> Self {
        Self {
            question: question.into(),
            brand,
            period: None,
        }
    }

    pub fn with_period(mut self, period: PeriodTag) -> Self {
        self.period = Some(period);
        self
    }
}

/// Outcome of one batch
///
/// `checks` and `failures` follow the provider order the use case was built
/// with. A provider appears in exactly one of `checks`, `failures` or
/// `abandoned`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckBatch {
    pub question: String,
    pub brand: String,
    pub checks: Vec<VisibilityCheck>,
    pub failures: Vec<ProviderFailure>,
    /// Providers still in flight when the batch was cancelled
    pub abandoned: Vec<ProviderId>,
    pub cancelled: bool,
}

impl CheckBatch {
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.abandoned.is_empty()
    }

    /// Failure reported for a provider, if any
    pub fn failure_for(&self, provider: &ProviderId) -> Option<&ProviderFailure> {
        self.failures.iter().find(|f| &f.provider == provider)
    }

    pub fn check_for(&self, provider: &ProviderId) -> Option<&VisibilityCheck> {
        self.checks.iter().find(|c| &c.provider == provider)
    }
}

/// Use case for running one visibility check batch
pub struct RunCheckUseCase {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    clock: Arc<dyn Clock>,
    params: CheckParams,
    cancellation_token: Option<CancellationToken>,
}

impl RunCheckUseCase {
    pub fn new(providers: Vec<Arc<dyn ProviderAdapter>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            providers,
            clock,
            params: CheckParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: CheckParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &CheckParams {
        &self.params
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id().clone()).collect()
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunCheckInput) -> Result<CheckBatch, RunCheckError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunCheckInput,
        progress: &dyn CheckProgressNotifier,
    ) -> Result<CheckBatch, RunCheckError> {
        if self.providers.is_empty() {
            return Err(RunCheckError::NoProviders);
        }
        input.brand.validate()?;

        let question = input.question.text().to_string();
        let timeout = self.params.provider_timeout;
        info!(
            "Checking '{}' for {} across {} providers",
            question,
            input.brand.name,
            self.providers.len()
        );
        progress.on_batch_start(&question, self.providers.len());

        let mut join_set = JoinSet::new();
        for (index, provider) in self.providers.iter().enumerate() {
            let provider = Arc::clone(provider);
            let question = question.clone();

            join_set.spawn(async move {
                let id = provider.id().clone();
                let result = match tokio::time::timeout(timeout, provider.ask(&question, timeout)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderFailure::timeout(id, timeout)),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<Slot>> = vec![None; self.providers.len()];
        let mut cancelled = false;

        loop {
            let next = if let Some(ref token) = self.cancellation_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        cancelled = true;
                        None
                    }
                    next = join_set.join_next() => next,
                }
            } else {
                join_set.join_next().await
            };

            let Some(joined) = next else {
                break;
            };
            self.fill_slot(joined, &mut slots, progress);
        }

        if cancelled {
            // Tasks that finished before the cancel was observed still count
            while let Some(joined) = join_set.try_join_next() {
                self.fill_slot(joined, &mut slots, progress);
            }
            join_set.abort_all();
        }

        let mut batch = CheckBatch {
            question: question.clone(),
            brand: input.brand.name.clone(),
            checks: Vec::new(),
            failures: Vec::new(),
            abandoned: Vec::new(),
            cancelled,
        };

        for (provider, slot) in self.providers.iter().zip(slots) {
            match slot {
                Some((Ok(answer), received_at)) => {
                    let classification = classify_answer(&answer, &input.brand);
                    let mut check = VisibilityCheck::new(
                        &input.brand.name,
                        &question,
                        &answer,
                        classification,
                        received_at,
                    )
                    .with_period(input.period);
                    if !self.params.keep_raw_answer {
                        check = check.without_raw_answer();
                    }
                    batch.checks.push(check);
                }
                Some((Err(failure), _)) => batch.failures.push(failure),
                None if cancelled => batch.abandoned.push(provider.id().clone()),
                None => batch.failures.push(ProviderFailure::new(
                    provider.id().clone(),
                    FailureKind::Unavailable,
                    "provider task ended without a result",
                )),
            }
        }

        progress.on_batch_complete(&question);
        info!(
            "Batch finished: {} checks, {} failures, {} abandoned",
            batch.checks.len(),
            batch.failures.len(),
            batch.abandoned.len()
        );

        Ok(batch)
    }
}

type Slot = (ProviderResult, DateTime<Utc>);

impl RunCheckUseCase {
    fn fill_slot(
        &self,
        joined: Result<(usize, ProviderResult), JoinError>,
        slots: &mut [Option<Slot>],
        progress: &dyn CheckProgressNotifier,
    ) {
        match joined {
            Ok((index, result)) => {
                let provider = self.providers[index].id();
                match &result {
                    Ok(answer) => debug!(
                        "Provider {} answered in {}ms",
                        provider,
                        answer.latency.as_millis()
                    ),
                    Err(failure) => warn!("Provider {} failed: {}", provider, failure),
                }
                progress.on_provider_complete(provider, result.is_ok());
                slots[index] = Some((result, self.clock.now()));
            }
            Err(e) => {
                warn!("Provider task join error: {}", e);
            }
        }
    }
}

/// Append every check of a batch to the store, each under `timeout`.
///
/// Stops at the first storage error; checks appended before it stay stored.
pub async fn record_batch(
    store: &dyn HistoryStore,
    batch: &CheckBatch,
    timeout: std::time::Duration,
) -> Result<usize, StorageError> {
    for check in &batch.checks {
        bounded(timeout, store.append(check.clone())).await.inspect_err(|e| {
            warn!("Failed to record check for {}: {}", check.provider, e);
        })?;
    }
    Ok(batch.checks.len())
}
