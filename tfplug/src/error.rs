//! Error types for tfplug

/// Errors raised by dynamic value access, import ID parsing and logging setup
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Invalid import ID: {0}")]
    ImportFailed(String),

    #[error("Logging setup failed: {0}")]
    LoggingError(String),

    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = std::result::Result<T, TfplugError>;

impl From<String> for TfplugError {
    fn from(s: String) -> Self {
        TfplugError::Custom(s)
    }
}

impl From<&str> for TfplugError {
    fn from(s: &str) -> Self {
        TfplugError::Custom(s.to_string())
    }
}
