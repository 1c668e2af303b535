//! Error types for the post-processing crates.

use std::path::Path;
use thiserror::Error;

/// Result type alias using PostprocError.
pub type Result<T> = std::result::Result<T, PostprocError>;

/// Broad classification of a failure, mirroring how callers are expected to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied malformed input; fix and call again.
    Validation,
    /// A file exists but its content cannot be decoded.
    FileFormat,
    /// A path could not be read or written.
    Io,
}

/// Primary error type for post-processing operations.
#[derive(Debug, Error)]
pub enum PostprocError {
    // === Validation Errors ===
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Grid '{0}' is not installed")]
    GridNotInstalled(String),

    #[error("Grid '{0}' was uninstalled and must be reinstalled before use")]
    GridUninstalled(String),

    #[error("Grid '{0}' is already installed")]
    DuplicateGrid(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // === File Errors ===
    #[error("Invalid file format in '{path}': {reason}")]
    FileFormat { path: String, reason: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl PostprocError {
    /// Create an InvalidInput error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a FileFormat error for the given path.
    pub fn file_format(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::FileFormat {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Create an Io error for the given path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PostprocError::InvalidInput(_)
            | PostprocError::InvalidParameter { .. }
            | PostprocError::GridNotInstalled(_)
            | PostprocError::GridUninstalled(_)
            | PostprocError::DuplicateGrid(_)
            | PostprocError::Config(_) => ErrorKind::Validation,

            PostprocError::FileFormat { .. } => ErrorKind::FileFormat,

            PostprocError::Io { .. } => ErrorKind::Io,
        }
    }
}

impl From<std::io::Error> for PostprocError {
    fn from(err: std::io::Error) -> Self {
        PostprocError::Io {
            path: "<unknown>".to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for PostprocError {
    fn from(err: serde_yaml::Error) -> Self {
        PostprocError::Config(format!("YAML error: {}", err))
    }
}

impl From<serde_json::Error> for PostprocError {
    fn from(err: serde_json::Error) -> Self {
        PostprocError::Config(format!("JSON error: {}", err))
    }
}
