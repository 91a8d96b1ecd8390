pub mod config;
pub mod error;

pub use config::{CreatePolicy, MutationConfig, NotificationConfig, SubscriptionConfig, SyncConfig};
pub use error::{RemoteError, Result, SyncError};
