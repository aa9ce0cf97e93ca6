use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("decode error for {key}: {reason}")]
    Decode { key: String, reason: String },
    #[error("storage read error: {0}")]
    StorageRead(String),
    #[error("storage write error: {0}")]
    StorageWrite(String),
    #[error("concurrent modification: {0}")]
    Conflict(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }

    pub fn decode(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::Decode { key: key.to_string(), reason: reason.to_string() }
    }
}
