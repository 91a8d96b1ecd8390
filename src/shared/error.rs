use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by the remote resource endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Remote call failed with status {status}: {body}")]
pub struct RemoteError {
    pub status: u16,
    pub body: String,
}

impl RemoteError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl SyncError {
    pub fn validation(message: impl Into<String>) -> Self {
        SyncError::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
