//! Error types for identifier fetching.

/// Failure to obtain the session identifier from the development server.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// HTTP request failed (connection refused, DNS, protocol error).
    #[error("HTTP request failed: {0}")]
    Request(#[source] ureq::Error),

    /// Server answered with a non-success status.
    #[error("HTTP error: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[source] ureq::Error),

    /// Blocking request task was cancelled or panicked.
    #[error("request interrupted: {0}")]
    Interrupted(String),
}
