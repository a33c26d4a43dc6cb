//! Database operation errors.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),

    #[error("suite request not found: {0}")]
    RequestNotFound(Uuid),

    #[error("execution not found: {0}")]
    ExecutionNotFound(Uuid),

    #[error("illegal status transition for suite request {id}: {from} -> {to}")]
    IllegalTransition {
        id: Uuid,
        from: String,
        to: String,
    },

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid stored value: {0}")]
    InvalidStoredValue(String),

    #[error("migration error: {0}")]
    Migration(String),
}

impl From<DatabaseError> for DomainError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::RequestNotFound(_) | DatabaseError::ExecutionNotFound(_) => {
                DomainError::NotFound(err.to_string())
            }
            DatabaseError::IllegalTransition { .. } => DomainError::Validation(err.to_string()),
            other => DomainError::System(other.to_string()),
        }
    }
}
