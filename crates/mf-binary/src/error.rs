//! Error types for binary file decoding.

use gw_common::PostprocError;
use std::path::Path;
use thiserror::Error;

/// Result type for decoder operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Failures while decoding a binary output file.
///
/// Offsets are byte positions of the record header in the file.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file ends inside a record.
    #[error("record at byte {offset} is truncated: {what}")]
    Truncated { offset: usize, what: String },

    /// Header values are inconsistent with the declared layout or precision.
    #[error("implausible record header at byte {offset}: {reason}")]
    ImplausibleHeader { offset: usize, reason: String },

    /// Compact budget record with an unsupported storage method.
    #[error("unknown budget storage method {code} at byte {offset}")]
    UnknownMethod { offset: usize, code: i32 },

    /// A cell reference lies outside the grid.
    #[error("record at byte {offset} references cell {cell} but only {ncells} cells exist")]
    CellOutOfRange {
        offset: usize,
        cell: i64,
        ncells: usize,
    },

    /// Neither single nor double precision yields a consistent file.
    #[error("cannot determine precision: {0}")]
    UnknownPrecision(String),
}

impl DecodeError {
    /// Attach the file path and convert into the workspace error type.
    pub fn at(self, path: impl AsRef<Path>) -> PostprocError {
        match self {
            DecodeError::Io(source) => PostprocError::io(path, source),
            other => PostprocError::file_format(path, other.to_string()),
        }
    }
}

impl From<DecodeError> for PostprocError {
    fn from(err: DecodeError) -> Self {
        err.at("<unknown>")
    }
}
