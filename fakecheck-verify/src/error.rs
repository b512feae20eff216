use std::time::Duration;

/// Error types for the verification pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Missing or invalid configuration (API keys, endpoints)
    ConfigError(String),
    /// The request never got an HTTP response
    NetworkError(String),
    /// The API answered with an error status or an unexpected shape
    ApiError(String),
    /// The model reply could not be read as an analysis
    ParseError(String),
    /// The submitted text failed validation; one message per problem
    InvalidInput(Vec<String>),
    /// Too many requests from the same user inside the window
    RateLimited { retry_after: Duration },
    /// History could not be read or written
    StorageError(String),
    /// General error with context
    Other(String),
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            VerifyError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            VerifyError::ApiError(msg) => write!(f, "API error: {}", msg),
            VerifyError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            VerifyError::InvalidInput(errors) => write!(f, "Invalid input: {}", errors.join("; ")),
            VerifyError::RateLimited { retry_after } => {
                write!(f, "Rate limited, retry in {}s", retry_after.as_secs())
            }
            VerifyError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            VerifyError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for VerifyError {}

/// The request URL is stripped so query credentials never reach logs
impl From<reqwest::Error> for VerifyError {
    fn from(e: reqwest::Error) -> Self {
        VerifyError::NetworkError(e.without_url().to_string())
    }
}

impl From<std::io::Error> for VerifyError {
    fn from(e: std::io::Error) -> Self {
        VerifyError::StorageError(e.to_string())
    }
}

impl From<serde_json::Error> for VerifyError {
    fn from(e: serde_json::Error) -> Self {
        VerifyError::ParseError(e.to_string())
    }
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerifyError>;
