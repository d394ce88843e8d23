//! Error types for the upstream crate.

use thiserror::Error;

/// Errors that can occur while fetching a record from an upstream service.
///
/// A missing record is not an error: fetchers return `Ok(None)` for a 404 or
/// an empty body, so callers can tell "not found" apart from "unreachable".
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The request did not complete within the configured timeout
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u128 },

    /// Connection, TLS, or body-read failure
    #[error("failed to reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status other than 404
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was present but was not a JSON object
    #[error("invalid record from {url}: {reason}")]
    InvalidRecord { url: String, reason: String },
}

impl UpstreamError {
    /// True when the failure came from the network rather than the payload.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            UpstreamError::Timeout { .. } | UpstreamError::Transport { .. }
        )
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, UpstreamError>;
