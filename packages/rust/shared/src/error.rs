//! Error types for webcorpus.
//!
//! Library crates use [`WebCorpusError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all webcorpus operations.
#[derive(Debug, thiserror::Error)]
pub enum WebCorpusError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A single URL's retrieval failed (network, timeout, or non-2xx status).
    #[error("fetch error for {url}: {cause}")]
    Fetch { url: String, cause: String },

    /// A payload could not be decoded for its declared content kind.
    #[error("extract error: {message}")]
    Extract { message: String },

    /// External transcoding or transcription failure for audio payloads.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (schema mismatch, invalid URL, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WebCorpusError>;

impl WebCorpusError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a fetch error tagged with the URL it failed on.
    pub fn fetch(url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            cause: cause.into(),
        }
    }

    /// Create an extract error from any displayable message.
    pub fn extract(msg: impl Into<String>) -> Self {
        Self::Extract {
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
