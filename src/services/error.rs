//! Service error type

use crate::db::repositories::MissingRow;

/// Error types shared by the tag, topic and article services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request was rejected before touching storage
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The addressed entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage failed or refused the operation
    #[error("Storage error: {0}")]
    StorageError(anyhow::Error),
}

impl From<anyhow::Error> for ServiceError {
    /// A row that vanished under an update is reported as NotFound
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<MissingRow>() {
            Some(missing) => ServiceError::not_found(missing.entity, missing.id),
            None => ServiceError::StorageError(err),
        }
    }
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::ValidationError(message.into())
    }

    pub fn not_found(entity: &str, id: i64) -> Self {
        ServiceError::NotFound(format!("{} with ID {} not found", entity, id))
    }
}
