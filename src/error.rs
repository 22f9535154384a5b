//! Error handling for querycsv
//!
//! This module defines the error type shared by every stage of the
//! import-and-execute pipeline. All variants are fatal to the current
//! invocation; the binary turns them into an exit status and a message.

use thiserror::Error;

/// QueryCsvError represents all possible errors raised by the library
///
/// The pipeline distinguishes:
/// - structural problems with the delimited input (dialect, header, row shape)
/// - statements rejected by the backing SQLite store
/// - plain I/O and CSV decoding failures
#[derive(Error, Debug)]
pub enum QueryCsvError {
    /// Error during file system operations (reading/writing files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while decoding or encoding delimited records
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The sampled text was too irregular to determine a dialect
    #[error("Could not determine dialect of {source_name}: {reason}")]
    DialectInference { source_name: String, reason: String },

    /// The source has no usable header row
    #[error("Malformed source {source_name}: {reason}")]
    MalformedSource { source_name: String, reason: String },

    /// A data row's cell count differs from the header's
    #[error("{source_name}, line {line}: expected {expected} fields, found {found}")]
    RowShape {
        source_name: String,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// The backing store rejected a statement
    #[error("Failed to execute `{statement}`: {source}")]
    StatementExecution {
        statement: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Any other failure reported by the backing store
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// No statement was given to execute
    #[error("No SQL statements to execute")]
    EmptyScript,

    /// Error for invalid [table=]file specifications
    #[error("Invalid file specification: {0}")]
    InvalidFileSpec(String),

    /// Error for an unusable explicit field separator
    #[error("Invalid field separator: {0}. Must be a single character.")]
    InvalidSeparator(String),
}

/// Result type alias for operations that can produce a QueryCsvError
pub type QueryCsvResult<T> = std::result::Result<T, QueryCsvError>;
