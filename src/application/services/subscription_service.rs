use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::notification_service::NotificationService;
use crate::domain::SubscriptionEvent;
use crate::shared::{SubscriptionConfig, SyncConfig};
use crate::store::CollectionStore;

/// Applies pushed "entity added" events into the shared store.
///
/// The channel is at-least-once and unordered relative to local optimistic
/// operations; in particular a client receives the broadcast for its own
/// create. De-duplication lives in the collection merge, so replays and
/// self-deliveries degrade to logged no-ops.
pub struct SubscriptionService {
    store: CollectionStore,
    notifications: Arc<NotificationService>,
    config: SubscriptionConfig,
}

impl SubscriptionService {
    pub fn new(
        store: CollectionStore,
        notifications: Arc<NotificationService>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            store,
            notifications,
            config: config.subscription.clone(),
        }
    }

    /// Merge one pushed event. Returns whether the entity was appended.
    pub async fn handle_event(&self, event: SubscriptionEvent) -> bool {
        let entity = event.entity;
        let applied = self.store.merge_incoming(&entity).await;
        if applied {
            debug!(id = %entity.id, "Merged pushed entity");
            if self.config.notify_on_merge {
                self.notifications
                    .info(format!("{} added", entity.content))
                    .await;
            }
        }
        applied
    }

    /// Consume the push channel until it closes.
    pub async fn run(self, mut receiver: mpsc::Receiver<SubscriptionEvent>) {
        while let Some(event) = receiver.recv().await {
            self.handle_event(event).await;
        }
        info!("Subscription channel closed");
    }
}
