use thiserror::Error;

/// Error types for machine translation providers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// The provider answered, but not with a usable translation
    #[error("Translation error: {0}")]
    TranslationError(String),
    /// The request never got an answer
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Missing or rejected credentials, bad request
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
}

impl From<reqwest::Error> for MtError {
    fn from(e: reqwest::Error) -> Self {
        MtError::NetworkError(e.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
