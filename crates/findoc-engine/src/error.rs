//! Engine error types.

use thiserror::Error;

use findoc_traits::TraitError;

use crate::orchestrator::PipelineStage;

/// A collaborator failure, tagged with the pipeline step it came from.
#[derive(Debug, Error)]
pub enum StageError {
    /// Text extraction failed outright
    #[error("text extraction failed: {0}")]
    Extraction(#[source] TraitError),

    /// Structured analysis failed (timeout, malformed output, schema violation)
    #[error("analysis failed: {0}")]
    Analysis(#[source] TraitError),

    /// The result could not be stored
    #[error("storage failed: {0}")]
    Storage(#[source] TraitError),
}

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The uploaded document is malformed or unreadable
    #[error("invalid document: {0}")]
    Validation(String),

    /// Any other pipeline failure
    #[error("failed to process '{document}' after {stage}: {source}")]
    Processing {
        /// Original document name
        document: String,
        /// Last stage the document completed
        stage: PipelineStage,
        /// Underlying cause
        #[source]
        source: StageError,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl EngineError {
    /// Whether the caller sent a bad document, as opposed to an internal failure.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}
