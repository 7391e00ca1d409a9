use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}){}: {message}", .error_type.as_deref().map(|t| format!(" {}", t)).unwrap_or_default())]
    ApiError {
        status: u16,
        error_type: Option<String>,
        message: String,
    },

    #[error("resource not found: {message}")]
    NotFound { message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Request signing failed: {0}")]
    SigningError(String),

    #[error("Failed to resolve AWS credentials: {0}")]
    CredentialsError(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}
