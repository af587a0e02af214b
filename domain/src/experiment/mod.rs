//! Experiment domain
//!
//! A before/after experiment moves through a fixed lifecycle and, once a test
//! period exists, can be turned into a [`ComparisonReport`].

pub mod entities;
pub mod report;
pub mod statistics;

pub use entities::{Experiment, ExperimentAction, ExperimentId, ExperimentState};
pub use report::{
    Caveat, ComparisonReport, MetricsDelta, PeriodMetrics, PeriodWindow, ProviderComparison,
    ProviderMetrics, ReportPolicy,
};
pub use statistics::{two_proportion_test, ConfidenceLevel, Significance};
