use std::io;
use thiserror::Error;

use crate::warning::Warning;

/// Error type for import operations.
///
/// Row and field problems are normally recorded as [`Warning`]s and the
/// import continues. They only surface here when the reader was built with
/// `raise_on_error(true)`, or when the input stops yielding usable rows.
#[derive(Error, Debug)]
pub enum ImportError {
    /// A bad row or field was found while `raise_on_error` is set.
    #[error("{0}")]
    Rejected(Warning),

    /// Too many consecutive bad rows within a single pull.
    #[error("Failed to find a good line after {tries} tries (line {line}, row {row})")]
    RecoveryBoundExceeded {
        /// Attempts made in the failing pull.
        tries: usize,
        /// Line counter at the time of failure.
        line: usize,
        /// Row counter (ignored + success) at the time of failure.
        row: usize,
    },

    /// IO error while opening or reading the input.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid schema or reader configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured encoding label is not known.
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
}

impl ImportError {
    /// Returns the warning that caused a rejection, if any.
    pub fn warning(&self) -> Option<&Warning> {
        match self {
            ImportError::Rejected(warning) => Some(warning),
            _ => None,
        }
    }
}

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
