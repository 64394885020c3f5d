//! Error types for the data-loader crate.
//!
//! Every variant carries enough context (file, record id, field) for the
//! caller to act on it.

use thiserror::Error;

/// Errors that can occur while loading, validating or enriching a catalog
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Catalog document is not valid JSON or doesn't match the record shape
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// A record field had an invalid value
    #[error("Invalid value for {field} in record {id:?}: {value}")]
    InvalidValue {
        id: String,
        field: String,
        value: String,
    },

    /// The same identifier appears more than once in the catalog
    #[error("Duplicate movie id {id:?} at positions {first} and {second}")]
    DuplicateId {
        id: String,
        first: usize,
        second: usize,
    },

    /// Enrichment settings are unusable
    #[error("Invalid enrichment setting {parameter}: {value}")]
    InvalidEnrichment { parameter: String, value: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
