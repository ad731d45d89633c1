//! Error types for the portal client.

use thiserror::Error;

/// Internal request failures.
///
/// These never escape the client's public API: every operation resolves a
/// failure into an error envelope (`ApiResponse::Error`) carrying either the
/// server-provided message or the operation's fallback message.
#[derive(Debug, Error)]
pub enum PortalError {
    /// No response received (connection refused, DNS failure, timeout)
    #[error("network error: {0}")]
    Network(reqwest::Error),

    /// Non-2xx response with no parseable error envelope
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),

    /// Response body did not match the expected envelope shape
    #[error("unexpected response body: {0}")]
    Parse(reqwest::Error),
}
