//! Error types for reddit2epub.
//!
//! Library crates use [`Reddit2EpubError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all reddit2epub operations.
#[derive(Debug, thiserror::Error)]
pub enum Reddit2EpubError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The Reddit API answered with a non-success status.
    #[error("reddit API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// OAuth token could not be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API payload did not have the expected shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The URL does not point at a Reddit post.
    #[error("not a reddit post URL: {0}")]
    InvalidUrl(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Caller-supplied input violated a contract.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Markdown-to-XHTML rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// EPUB packaging error.
    #[error("epub error: {0}")]
    Epub(String),

    /// The anchor post is not a text post.
    #[error("no text content in anchor post {url}")]
    NoTextContent { url: String },

    /// Zero posts share the anchor's title prefix.
    #[error("no text chapters found with title prefix '{prefix}'")]
    NoChaptersFound { prefix: String },

    /// Only the anchor itself shares the title prefix.
    #[error(
        "no other chapters found which share the first {overlap} words with other posts from this author"
    )]
    SingleChapterOnly { overlap: usize },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, Reddit2EpubError>;

impl Reddit2EpubError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an API error from a status code and message.
    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::Api {
            status,
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
