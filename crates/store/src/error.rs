//! Error types for the storage backends.

use catalog_data::CatalogDataError;
use thiserror::Error;

/// Errors that can occur while reading or writing a store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Catalog data error: {0}")]
    Data(#[from] CatalogDataError),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
