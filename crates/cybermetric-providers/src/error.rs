//! Backend error types.

use thiserror::Error;

/// Failures talking to a model backend.
///
/// The evaluation engine retries every one of these with backoff. The
/// variants only matter for log lines and for callers such as `list-models`.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP 429.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// HTTP 401 (bad or missing API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Any other non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    ApiError { status: u16, body: String },

    /// A 2xx response whose body was not JSON.
    #[error("malformed response body: {0}")]
    MalformedResponse(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The connection could not be opened at all.
    #[error("backend not reachable at {url}{hint}")]
    Unreachable { url: String, hint: &'static str },

    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Map a transport-level reqwest failure.
    pub(crate) fn from_transport(e: &reqwest::Error, url: &str, timeout_secs: u64, hint: &'static str) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else if e.is_connect() {
            ProviderError::Unreachable {
                url: url.to_string(),
                hint,
            }
        } else {
            ProviderError::NetworkError(e.to_string())
        }
    }
}
