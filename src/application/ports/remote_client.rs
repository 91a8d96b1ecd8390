use async_trait::async_trait;

use crate::domain::{EntityDraft, EntityRecord};
use crate::shared::RemoteError;

/// Transport seam for the remote resource endpoints
/// (`GET /resource`, `POST /resource`, `PUT /resource/:id`,
/// `DELETE /resource/:id`).
///
/// Implementations live outside this crate and perform no retries; a
/// failed call is reported once and the coordinator decides what to do.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn list(&self) -> Result<Vec<EntityRecord>, RemoteError>;

    /// Create from a draft; the response carries the canonical id.
    async fn create(&self, draft: &EntityDraft) -> Result<EntityRecord, RemoteError>;

    /// Full-record replace; the response is authoritative for fields the
    /// server may normalize.
    async fn update(&self, id: &str, record: &EntityRecord)
        -> Result<EntityRecord, RemoteError>;

    async fn delete(&self, id: &str) -> Result<(), RemoteError>;
}
