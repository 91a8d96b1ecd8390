use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::Notification;
use crate::shared::NotificationConfig;

#[derive(Default)]
struct Slot {
    current: Option<Notification>,
    /// Bumped on every notify/clear; a woken expiry task only clears the
    /// slot when its generation still matches.
    generation: u64,
}

/// Single-slot timed message display.
///
/// An explicit instance owns its timer state, so independent notification
/// surfaces never collide and tests need no shared-state reset. Invariant:
/// at most one live expiry task; starting a new notification aborts the
/// previous one before scheduling its own.
pub struct NotificationService {
    slot: Arc<RwLock<Slot>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    config: NotificationConfig,
}

impl NotificationService {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot::default())),
            timer: Mutex::new(None),
            config,
        }
    }

    fn default_duration(&self) -> Duration {
        Duration::from_secs(self.config.duration_secs)
    }

    /// Show `notification` for `duration`, replacing whatever is showing.
    /// No queueing: the previous message loses the rest of its time.
    pub async fn notify(&self, notification: Notification, duration: Duration) {
        let mut timer = self.timer.lock().await;
        if let Some(handle) = timer.take() {
            // A late expiry of the previous message must never clear this one.
            handle.abort();
        }

        let generation = {
            let mut slot = self.slot.write().await;
            slot.generation += 1;
            debug!(message = %notification.message, is_error = notification.is_error, "Showing notification");
            slot.current = Some(notification);
            slot.generation
        };

        let slot = Arc::clone(&self.slot);
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut slot = slot.write().await;
            if slot.generation == generation {
                slot.current = None;
            }
        }));
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.notify(Notification::info(message), self.default_duration())
            .await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.notify(Notification::error(message), self.default_duration())
            .await;
    }

    /// Drop the current message now (manual dismiss or app-level reset).
    pub async fn clear(&self) {
        let mut timer = self.timer.lock().await;
        if let Some(handle) = timer.take() {
            handle.abort();
        }
        let mut slot = self.slot.write().await;
        slot.generation += 1;
        slot.current = None;
    }

    pub async fn current(&self) -> Option<Notification> {
        self.slot.read().await.current.clone()
    }
}
