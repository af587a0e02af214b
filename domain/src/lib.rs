//! Domain layer for aeo-tracker
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Visibility
//!
//! A [`VisibilityCheck`] records how a brand showed up in one provider's
//! answer to one question. The classifier maps answer text to a
//! [`VisibilityStatus`] through an ordered rule table:
//!
//! - **Featured** (100): top or exclusive suggestion in the opening segment
//! - **Mentioned** (70): positive or neutral mention in prose
//! - **Listed** (40): only inside a list of alternatives
//! - **Cited Source** (30): only the brand's domain, in a reference section
//! - **Not Found** (0)
//!
//! ## Experiments
//!
//! An [`Experiment`] compares a control period with a test period after a
//! content change and produces a [`ComparisonReport`] with a two-proportion
//! significance test on visibility rate.

pub mod config;
pub mod core;
pub mod experiment;
pub mod generation;
pub mod provider;
pub mod visibility;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{brand::Brand, error::DomainError, question::Question};
pub use experiment::{
    Caveat, ComparisonReport, ConfidenceLevel, Experiment, ExperimentAction, ExperimentId,
    ExperimentState, MetricsDelta, PeriodMetrics, PeriodWindow, ProviderComparison,
    ProviderMetrics, ReportPolicy, Significance,
};
pub use generation::{keyword_to_question, question_variations, VariationOptions};
pub use provider::{FailureKind, ProviderAnswer, ProviderFailure, ProviderId, ProviderResult};
pub use visibility::{
    classify, classify_answer, format_score, Classification, ListPosition, PeriodTag, ScoreBand,
    Trend, TrendDirection, VisibilityCheck, VisibilityStatus,
};
