//! Provider adapter port
//!
//! Defines the uniform capability every LLM backend exposes to the
//! orchestrator: answer one question within a bounded time.

use aeo_domain::{ProviderId, ProviderResult};
use async_trait::async_trait;
use std::time::Duration;

/// One LLM backend
///
/// Implementations (adapters) live in the infrastructure layer. They never
/// retry and never panic on bad input; every problem is mapped to a
/// [`ProviderFailure`](aeo_domain::ProviderFailure) with a
/// [`FailureKind`](aeo_domain::FailureKind).
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable identifier of this backend
    fn id(&self) -> &ProviderId;

    /// Model this adapter asks, if fixed
    fn model(&self) -> Option<&str> {
        None
    }

    /// Ask a question, giving up after `timeout`
    async fn ask(&self, question: &str, timeout: Duration) -> ProviderResult;
}
