//! Application layer for aeo-tracker
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::{CheckParams, ExperimentPolicy};
pub use ports::{
    clock::{Clock, SystemClock},
    experiment_repository::ExperimentRepository,
    history_store::{sort_by_timestamp, HistoryQuery, HistoryStore, TimeRange},
    progress::{CheckProgressNotifier, NoProgress},
    provider::ProviderAdapter,
    storage::{bounded, StorageError},
};
pub use use_cases::manage_experiment::{
    AdvanceOutcome, CreateExperimentInput, ExperimentError, ExperimentManager,
    ExperimentRunOutcome, ExperimentStatus,
};
pub use use_cases::run_check::{
    record_batch, CheckBatch, RunCheckError, RunCheckInput, RunCheckUseCase,
};
pub use use_cases::visibility_summary::{VisibilitySummary, VisibilitySummaryUseCase};
