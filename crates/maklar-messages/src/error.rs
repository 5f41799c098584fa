//! Error types for catalog loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for catalog operations.
pub type MessageResult<T> = Result<T, MessageError>;

/// Errors raised while loading a message catalog.
///
/// These never escape message resolution: the resolver logs them and falls
/// back to the default locale or the raw key.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MessageError {
    /// The source has no catalog for this locale.
    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    /// Reading a catalog file failed.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Catalog file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not a valid message tree.
    #[error("failed to parse catalog for locale '{locale}': {message}")]
    Parse {
        /// Locale being loaded.
        locale: String,
        /// Parser message.
        message: String,
    },
}

impl MessageError {
    /// Creates a parse error.
    pub fn parse(locale: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            locale: locale.into(),
            message: message.to_string(),
        }
    }
}
