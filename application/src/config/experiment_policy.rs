//! Experiment policy: report thresholds and storage deadlines.

use aeo_domain::ReportPolicy;
use std::time::Duration;

/// Controls how the experiment manager reads, writes and reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentPolicy {
    pub report: ReportPolicy,
    /// Deadline for each repository or HistoryStore operation.
    pub storage_timeout: Duration,
}

impl Default for ExperimentPolicy {
    fn default() -> Self {
        Self {
            report: ReportPolicy::default(),
            storage_timeout: Duration::from_secs(10),
        }
    }
}

impl ExperimentPolicy {
    pub fn with_report(mut self, report: ReportPolicy) -> Self {
        self.report = report;
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }
}
