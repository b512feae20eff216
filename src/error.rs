/// Error types for loading translation documents and preferences
///
/// Resolution itself never fails; these errors only surface from the
/// loading layer and are downgraded to warnings by [`crate::I18n::load`].
#[derive(Debug)]
pub enum I18nError {
    /// Reading a document or preference file failed
    Io(std::io::Error),
    /// A document was not valid JSON
    Json(serde_json::Error),
    /// A request for a remote document failed
    Network(reqwest::Error),
    /// A document parsed, but its root was not a JSON object
    InvalidDocument(String),
    /// A language tag contained characters that cannot form a path segment
    InvalidLanguage(String),
}

impl std::fmt::Display for I18nError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            I18nError::Io(e) => write!(f, "I/O error: {}", e),
            I18nError::Json(e) => write!(f, "Invalid JSON: {}", e),
            I18nError::Network(e) => write!(f, "Network error: {}", e),
            I18nError::InvalidDocument(msg) => write!(f, "Invalid document: {}", msg),
            I18nError::InvalidLanguage(lang) => write!(f, "Invalid language tag: {}", lang),
        }
    }
}

impl std::error::Error for I18nError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            I18nError::Io(e) => Some(e),
            I18nError::Json(e) => Some(e),
            I18nError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for I18nError {
    fn from(e: std::io::Error) -> Self {
        I18nError::Io(e)
    }
}

impl From<serde_json::Error> for I18nError {
    fn from(e: serde_json::Error) -> Self {
        I18nError::Json(e)
    }
}

impl From<reqwest::Error> for I18nError {
    fn from(e: reqwest::Error) -> Self {
        I18nError::Network(e)
    }
}

/// Result type for loading operations
pub type I18nResult<T> = Result<T, I18nError>;
