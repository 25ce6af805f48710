//! Error types for the policy question answering service

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, QaError>;

/// Errors raised while loading documents or answering questions
#[derive(Debug, Error)]
pub enum QaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to download document: {0}")]
    DownloadFailed(String),

    #[error("Failed to download document: upstream returned status {status}")]
    UpstreamStatus { status: u16 },

    #[error("Document download timed out: {0}")]
    DownloadTimeout(String),

    #[error("Document too large: {size} bytes exceeds limit of {limit} bytes")]
    DocumentTooLarge { size: usize, limit: usize },

    #[error("{0}")]
    ExtractionFailed(String),

    #[error("Malformed question: expected a string, got {0}")]
    MalformedQuestion(String),

    #[error("Question evaluation panicked: {0}")]
    QuestionPanicked(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QaError {
    /// Whether retrying the same document fetch might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::DownloadTimeout(_) | Self::DownloadFailed(_) => true,
            Self::UpstreamStatus { status } => *status >= 500,
            _ => false,
        }
    }
}

impl From<config::ConfigError> for QaError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
