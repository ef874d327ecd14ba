//! Error types for trait operations.

use thiserror::Error;

/// Common error type for collaborator and store operations.
#[derive(Debug, Error)]
pub enum TraitError {
    /// Text extraction from the document failed
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// Structured analysis of the extracted text failed
    #[error("analysis failed: {0}")]
    AnalysisFailed(String),

    /// Parse/deserialization error
    #[error("parse error: {0}")]
    ParseError(String),

    /// Connection to external service failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation timed out
    #[error("timeout")]
    Timeout,

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for TraitError {
    fn from(e: serde_json::Error) -> Self {
        TraitError::ParseError(e.to_string())
    }
}
