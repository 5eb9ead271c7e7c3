//! Error types for the catalog-data crate.

use thiserror::Error;

/// Errors that can occur while loading, parsing or validating catalog data.
#[derive(Error, Debug)]
pub enum CatalogDataError {
    /// Seed file could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Seed document couldn't be decoded
    ///
    /// `line` is the 1-based line reported by the JSON decoder.
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A record field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., product owned by an unknown seller)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u64 },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogDataError>;
