//! Error types for annotation data operations.

use thiserror::Error;

/// Errors that can occur while parsing or serializing annotation data.
#[derive(Error, Debug)]
pub enum FormatError {
    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Annotation data with an invalid overall structure
    #[error("invalid annotation data: {message}")]
    InvalidData {
        /// Description of the structural problem
        message: String,
    },

    /// A single shape entry that cannot be decoded
    #[error("invalid shape: {message}")]
    InvalidShape {
        /// Description of the shape problem
        message: String,
    },
}

impl FormatError {
    /// Create an invalid data error with a message.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create an invalid shape error with a message.
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape {
            message: message.into(),
        }
    }
}
