//! Error types for the alipay2ofx library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a statement.
///
/// Line indexes are 0-based positions in the decoded statement text.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input bytes are not valid in the declared encoding.
    #[error("Input is not valid {encoding} text")]
    Decoding { encoding: &'static str },

    /// Encoding label not recognised.
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// A data line did not split into the expected number of fields.
    #[error("Malformed record at line {line}: expected at least 16 fields, found {fields}")]
    MalformedRecord { line: usize, fields: usize },

    /// Account id brackets missing from the header line.
    #[error("Header format error: {0}")]
    HeaderFormat(String),

    /// A required numeric or date field could not be parsed.
    #[error("Invalid {field} at line {line}: {value:?}")]
    FieldParse {
        field: &'static str,
        line: usize,
        value: String,
    },

    /// The same transaction id appeared twice in one statement.
    #[error("Duplicate transaction id {id} at line {line}")]
    DuplicateTransactionId { id: String, line: usize },

    /// Invalid option value.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl Error {
    /// Line index the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedRecord { line, .. }
            | Error::FieldParse { line, .. }
            | Error::DuplicateTransactionId { line, .. } => Some(*line),
            Error::HeaderFormat(_) => Some(1),
            _ => None,
        }
    }
}
