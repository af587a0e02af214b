//! Shared HTTP plumbing for the provider adapters.
//!
//! Every adapter sends one JSON request and decodes one JSON response. The
//! failure mapping lives here so all backends report the same [`FailureKind`]
//! for the same transport condition.

use aeo_domain::{FailureKind, ProviderFailure, ProviderId};
use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Longest error body excerpt kept in a failure detail
const MAX_DETAIL_CHARS: usize = 300;

/// Build the client an adapter keeps for its lifetime.
///
/// No client-wide timeout is set; every request carries its own deadline.
pub fn build_client() -> Result<ReqwestClient, reqwest::Error> {
    ReqwestClient::builder()
        .user_agent(concat!("aeo-tracker/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Map a non-success HTTP status to a failure kind
pub fn kind_for_status(status: StatusCode) -> FailureKind {
    match status {
        StatusCode::TOO_MANY_REQUESTS => FailureKind::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::AuthError,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => FailureKind::Timeout,
        s if s.is_server_error() => FailureKind::Unavailable,
        _ => FailureKind::Malformed,
    }
}

/// Map a transport error to a failure
pub fn failure_from_error(
    provider: &ProviderId,
    error: &reqwest::Error,
    timeout: Duration,
) -> ProviderFailure {
    if error.is_timeout() {
        return ProviderFailure::timeout(provider.clone(), timeout);
    }
    if let Some(status) = error.status() {
        return ProviderFailure::new(provider.clone(), kind_for_status(status), error.to_string());
    }
    if error.is_decode() {
        return ProviderFailure::new(provider.clone(), FailureKind::Malformed, error.to_string());
    }
    ProviderFailure::new(provider.clone(), FailureKind::Unavailable, error.to_string())
}

/// Send `request` under `timeout` and decode a JSON body of type `T`.
pub async fn send_json<T: DeserializeOwned>(
    provider: &ProviderId,
    request: RequestBuilder,
    timeout: Duration,
) -> Result<T, ProviderFailure> {
    let response = request
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| failure_from_error(provider, &e, timeout))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| failure_from_error(provider, &e, timeout))?;

    if !status.is_success() {
        debug!("{} returned HTTP {}", provider, status);
        return Err(ProviderFailure::new(
            provider.clone(),
            kind_for_status(status),
            format!("HTTP {}: {}", status.as_u16(), excerpt(&body)),
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        ProviderFailure::new(
            provider.clone(),
            FailureKind::Malformed,
            format!("undecodable response body: {}", e),
        )
    })
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_DETAIL_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_DETAIL_CHARS).collect();
    format!("{}...", cut)
}
