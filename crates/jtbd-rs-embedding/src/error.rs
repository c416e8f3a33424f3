//! Error types for embedding generation.

use thiserror::Error;

/// Errors returned by embedding generators.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The HTTP client could not be built.
    #[error("client setup failed: {0}")]
    Setup(String),
    /// The request did not complete in time.
    #[error("embedding request timed out")]
    Timeout,
    /// Transport-level failure.
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The backend answered with a non-success status.
    #[error("embedding backend returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The backend answered with an unusable body.
    #[error("malformed embedding response: {0}")]
    Malformed(String),
    /// Backend-specific failure.
    #[error("embedding provider error: {0}")]
    Provider(String),
}
