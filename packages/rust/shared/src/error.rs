//! Error types for the rules generator.
//!
//! Library crates use [`ClineRulesError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all generator operations.
#[derive(Debug, thiserror::Error)]
pub enum ClineRulesError {
    /// The fragment directory could not be listed. Fatal for the run.
    #[error("fragment directory not found at {path:?}: {source}")]
    DirectoryNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A single fragment could not be read.
    #[error("could not read fragment {path:?}: {source}")]
    FragmentRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The metadata block of a fragment could not be parsed.
    #[error("front matter error: {message}")]
    FrontMatter { message: String },

    /// The assembled document could not be written.
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The interactive prompt failed or was aborted.
    #[error("prompt error: {message}")]
    Prompt { message: String },

    /// Filesystem I/O error outside the cases above.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad selection answer, invalid value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ClineRulesError>;

impl ClineRulesError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a front-matter error from any displayable message.
    pub fn front_matter(msg: impl Into<String>) -> Self {
        Self::FrontMatter {
            message: msg.into(),
        }
    }

    /// Create a prompt error from any displayable message.
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt {
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

    /// Whether this error must stop the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DirectoryNotFound { .. } | Self::Config { .. })
    }
}
