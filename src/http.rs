//! Shared HTTP client construction and failure classification.

use crate::error::{Result, TldwError};
use std::time::Duration;
use url::Url;

/// Default timeout for outbound requests (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Longest slice of an error body kept in a transport error.
const MAX_ERROR_BODY: usize = 300;

/// Create an HTTP client with a bounded per-request timeout.
pub fn create_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TldwError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Parse and validate an endpoint URL.
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| TldwError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TldwError::Config(format!(
            "Unsupported scheme '{}' in endpoint '{}'",
            other, endpoint
        ))),
    }
}

/// Map a reqwest failure onto the transport error taxonomy.
pub fn classify(endpoint: &str, timeout: Duration, err: reqwest::Error) -> TldwError {
    if err.is_timeout() {
        TldwError::Timeout {
            endpoint: endpoint.to_string(),
            after: timeout,
        }
    } else if err.is_decode() {
        TldwError::malformed(endpoint, err.to_string())
    } else {
        TldwError::transport(endpoint, err.to_string())
    }
}

/// Turn a non-success status into a transport error, keeping a body excerpt.
pub async fn ensure_success(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();

    Err(TldwError::transport(
        endpoint,
        format!("status {}: {}", status, excerpt.trim()),
    ))
}
