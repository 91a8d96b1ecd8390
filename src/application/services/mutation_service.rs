use std::sync::Arc;

use tracing::{debug, warn};

use super::notification_service::NotificationService;
use crate::application::ports::RemoteClient;
use crate::domain::{CollectionTransition, EntityDraft, EntityRecord};
use crate::shared::{CreatePolicy, MutationConfig, SyncConfig, SyncError};
use crate::store::CollectionStore;

/// Optimistic mutation coordinator.
///
/// Each mutation runs the machine `Applied(local)` → `Confirmed(remote)`
/// | `RolledBack(previous)`: apply locally, confirm remotely, reconcile
/// with the canonical record, or re-apply the last confirmed state on
/// failure. Every remote rejection is converted here into a rollback plus
/// one error notification before being surfaced; nothing propagates
/// uncaught into UI code. No retries; a failed mutation waits for a new
/// user action.
pub struct MutationService {
    store: CollectionStore,
    remote: Arc<dyn RemoteClient>,
    notifications: Arc<NotificationService>,
    config: MutationConfig,
}

impl MutationService {
    pub fn new(
        store: CollectionStore,
        remote: Arc<dyn RemoteClient>,
        notifications: Arc<NotificationService>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            store,
            remote,
            notifications,
            config: config.mutation.clone(),
        }
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    /// Initial load: fetch the server list and replace the collection.
    pub async fn load_all(&self) -> Result<(), SyncError> {
        match self.remote.list().await {
            Ok(records) => {
                debug!(count = records.len(), "Loaded collection from remote");
                self.store
                    .apply(CollectionTransition::SetAll(records))
                    .await;
                Ok(())
            }
            Err(err) => {
                self.notifications.error(err.to_string()).await;
                Err(err.into())
            }
        }
    }

    /// Create a new entity under the configured policy.
    pub async fn create(&self, draft: EntityDraft) -> Result<EntityRecord, SyncError> {
        self.validate_draft(&draft).await?;
        match self.config.create_policy {
            CreatePolicy::ConfirmThenApply => self.create_confirmed(draft).await,
            CreatePolicy::ApplyThenConfirm => self.create_optimistic(draft).await,
        }
    }

    /// Confirm-then-apply: the canonical id is required before the record
    /// enters the store, so a rejection leaves no trace to roll back.
    async fn create_confirmed(&self, draft: EntityDraft) -> Result<EntityRecord, SyncError> {
        match self.remote.create(&draft).await {
            Ok(canonical) => {
                debug!(id = %canonical.id, "Create confirmed");
                // A subscription self-delivery may have landed first.
                self.store.upsert(canonical.clone()).await;
                Ok(canonical)
            }
            Err(err) => {
                warn!(error = %err, "Create rejected by remote");
                self.notifications.error(err.to_string()).await;
                Err(err.into())
            }
        }
    }

    /// Apply-then-confirm: insert a placeholder immediately, then swap it
    /// for the canonical record. The placeholder is matched back by draft
    /// content, not by its id, since a merge may have replaced it meanwhile.
    async fn create_optimistic(&self, draft: EntityDraft) -> Result<EntityRecord, SyncError> {
        let placeholder = EntityRecord::local_draft(&draft);
        let placeholder_id = placeholder.id.clone();
        self.store
            .apply(CollectionTransition::Insert(placeholder))
            .await;

        match self.remote.create(&draft).await {
            Ok(canonical) => {
                debug!(id = %canonical.id, "Create confirmed, reconciling placeholder");
                self.store
                    .reconcile_created(|record| record.matches_draft(&draft), canonical.clone())
                    .await;
                Ok(canonical)
            }
            Err(err) => {
                warn!(error = %err, "Create rejected by remote, removing placeholder");
                self.store
                    .apply(CollectionTransition::Remove { id: placeholder_id })
                    .await;
                self.notifications.error(err.to_string()).await;
                Err(err.into())
            }
        }
    }

    /// Read-modify-write against the store's *current* value: apply the
    /// successor optimistically, confirm remotely, reconcile with the
    /// server's canonical record, or roll back to the pre-mutation record.
    pub async fn update<F>(&self, id: &str, f: F) -> Result<EntityRecord, SyncError>
    where
        F: FnOnce(&EntityRecord) -> EntityRecord,
    {
        let Some((previous, next)) = self.store.update_record(id, f).await else {
            let err = SyncError::validation(format!("Unknown entity id: {id}"));
            self.notifications.error(err.to_string()).await;
            return Err(err);
        };

        match self.remote.update(id, &next).await {
            Ok(canonical) => {
                self.store
                    .apply(CollectionTransition::Replace {
                        id: id.to_string(),
                        record: canonical.clone(),
                    })
                    .await;
                Ok(canonical)
            }
            Err(err) => {
                warn!(id, error = %err, "Update rejected by remote, rolling back");
                self.store
                    .apply(CollectionTransition::Replace {
                        id: id.to_string(),
                        record: previous,
                    })
                    .await;
                self.notifications.error(err.to_string()).await;
                Err(err.into())
            }
        }
    }

    /// Increment an entity's vote count by one.
    pub async fn vote(&self, id: &str) -> Result<EntityRecord, SyncError> {
        self.update(id, |record| {
            let mut next = record.clone();
            next.votes += 1;
            next
        })
        .await
    }

    /// Remove optimistically; re-insert on rejection. The original position
    /// is not preserved; display order is a derived sort anyway. An absent
    /// id is a benign no-op.
    pub async fn delete(&self, id: &str) -> Result<(), SyncError> {
        let Some(taken) = self.store.take_record(id).await else {
            debug!(id, "Delete of absent id, nothing to do");
            return Ok(());
        };

        match self.remote.delete(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(id, error = %err, "Delete rejected by remote, restoring record");
                self.store
                    .apply(CollectionTransition::Insert(taken))
                    .await;
                self.notifications.error(err.to_string()).await;
                Err(err.into())
            }
        }
    }

    /// Draft validation runs before any remote call; a malformed draft
    /// never mutates the store.
    async fn validate_draft(&self, draft: &EntityDraft) -> Result<(), SyncError> {
        if draft.content.trim().is_empty() {
            let err = SyncError::validation("Content must not be empty");
            self.notifications.error(err.to_string()).await;
            return Err(err);
        }
        Ok(())
    }
}
