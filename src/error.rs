//! Error types for mythos operations.

use thiserror::Error;

/// Result type alias for mythos operations.
pub type MythosResult<T> = Result<T, MythosError>;

/// Main error type for mythos operations.
///
/// Reconciliation itself is a total function and never fails; only
/// parsing an extraction response can.
#[derive(Error, Debug)]
pub enum MythosError {
    /// Extraction response could not be parsed.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MythosError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}
