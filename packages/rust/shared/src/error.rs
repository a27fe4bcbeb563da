//! Error types for the llms.txt generator.
//!
//! Library crates use [`LlmsTxtError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all generator operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmsTxtError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The site source could not be loaded or queried.
    #[error("source error: {0}")]
    Source(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad language slug, unknown language, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// JSON encoding/decoding error for persisted state.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// HTTP listener error.
    #[error("server error: {0}")]
    Server(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LlmsTxtError>;

impl LlmsTxtError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LlmsTxtError::config("missing output dir");
        assert_eq!(err.to_string(), "config error: missing output dir");

        let err = LlmsTxtError::validation("invalid language slug '../etc'");
        assert!(err.to_string().contains("../etc"));
    }
}
