//! Error taxonomy: store failures and caller-input failures.

use axum::http::StatusCode;
use thiserror::Error;

/// Failure raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("mirror error: {0}")]
    Mirror(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Backend(String),
}

/// Failure surfaced by the service layer. Persistence wraps any store
/// failure, including not-found on a required read; Validation covers
/// structurally invalid caller input.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
    #[error("invalid input: {0}")]
    Validation(String),
}

impl RegistryError {
    pub fn status(&self) -> StatusCode {
        match self {
            RegistryError::Persistence(StoreError::NotFound) => StatusCode::NOT_FOUND,
            RegistryError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}
