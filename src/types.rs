//! Shared error type for Shloka

use hyper::StatusCode;
use thiserror::Error;

/// Errors surfaced by the store, the seed reconciler and the HTTP layer
#[derive(Debug, Error)]
pub enum ShlokaError {
    /// Document store unreachable or an operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Canonical catalog is inconsistent or the store violates the seed postcondition
    #[error("Seed error: {0}")]
    Seed(String),

    /// Path-parameterized lookup yielded no record
    #[error("{0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShlokaError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShlokaError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<bson::ser::Error> for ShlokaError {
    fn from(e: bson::ser::Error) -> Self {
        ShlokaError::Database(format!("BSON encode failed: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, ShlokaError>;
