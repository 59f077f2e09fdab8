use thiserror::Error;

/// Errors raised by storage, dictionary loading and page operations
///
/// None of these reach consumers of [`crate::LanguageContext`]: translation
/// is best effort, so callers log and fall back instead of propagating.
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Durable preference storage is unusable
    #[error("Storage error: {0}")]
    Storage(String),

    /// A message file or directory does not have the expected shape
    #[error("Loader error: {0}")]
    Loader(String),

    /// The third-party translation script could not be loaded
    #[error("Script load failed: {0}")]
    ScriptLoad(String),

    /// The translation widget rejected its configuration
    #[error("Widget error: {0}")]
    Widget(String),
}

impl I18nError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        I18nError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub(crate) fn json(path: impl AsRef<std::path::Path>, source: serde_json::Error) -> Self {
        I18nError::Json {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

pub type I18nResult<T> = Result<T, I18nError>;
