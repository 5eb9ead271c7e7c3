//! Error types for the catalog service.

use crate::validation::FieldError;
use std::time::Duration;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by `CatalogService` operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Please log in to access this page")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The store refused the input (bad draft, duplicate account).
    #[error("{0}")]
    Rejected(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store task failed: {0}")]
    Task(String),
}

impl ServiceError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unauthorized => 401,
            ServiceError::Forbidden(_) => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::Validation(_) | ServiceError::Rejected(_) => 422,
            ServiceError::Store(_) | ServiceError::Timeout(_) | ServiceError::Task(_) => 500,
        }
    }

    /// Field-level problems, empty unless this is a validation failure.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ServiceError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(msg) | StoreError::Conflict(msg) => ServiceError::Rejected(msg),
            other => ServiceError::Store(other),
        }
    }
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
