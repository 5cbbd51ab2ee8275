use extraction_engine::RuleError;
use thiserror::Error;

/// Document-level failures. Page-level problems never appear here; they
/// degrade into warnings on the owning form's validation result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input is not a valid PDF document: {0}")]
    InvalidDocument(String),

    #[error("document contains no pages")]
    EmptyDocument,

    /// The caller aborted the document. No partial records are emitted.
    #[error("document processing was cancelled")]
    Cancelled,

    #[error(transparent)]
    InvalidRules(#[from] RuleError),

    #[error("invalid form-start marker pattern: {0}")]
    InvalidMarker(#[from] regex::Error),

    #[error("failed to load configuration from {path}: {message}")]
    Config { path: String, message: String },

    #[error("page worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
