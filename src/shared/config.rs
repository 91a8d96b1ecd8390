use serde::{Deserialize, Serialize};

/// Policy for when a freshly created entity is applied to the store.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CreatePolicy {
    /// Wait for the remote write so the canonical id is known before the
    /// record enters the store.
    #[default]
    ConfirmThenApply,
    /// Insert a placeholder record immediately and reconcile it once the
    /// remote write confirms.
    ApplyThenConfirm,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    pub notification: NotificationConfig,
    pub mutation: MutationConfig,
    pub subscription: SubscriptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Seconds a notification stays visible before it clears itself.
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MutationConfig {
    pub create_policy: CreatePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Fire an info notification when a pushed entity is merged in.
    pub notify_on_merge: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { duration_secs: 5 }
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            notify_on_merge: false,
        }
    }
}
