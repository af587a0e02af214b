//! Progress notification port
//!
//! Defines the interface for reporting progress while a check batch runs.

use aeo_domain::ProviderId;

/// Callback for progress updates during a check batch
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain log lines, etc.)
pub trait CheckProgressNotifier: Send + Sync {
    /// Called when a batch starts
    fn on_batch_start(&self, question: &str, total_providers: usize);

    /// Called when one provider produced an answer or a failure
    fn on_provider_complete(&self, provider: &ProviderId, success: bool);

    /// Called when a batch completes (or is cancelled)
    fn on_batch_complete(&self, question: &str);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl CheckProgressNotifier for NoProgress {
    fn on_batch_start(&self, _question: &str, _total_providers: usize) {}
    fn on_provider_complete(&self, _provider: &ProviderId, _success: bool) {}
    fn on_batch_complete(&self, _question: &str) {}
}
