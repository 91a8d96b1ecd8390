//! Client-side state synchronization core.
//!
//! Holds one in-memory collection of entities per resource type and keeps
//! it consistent across three inputs: optimistic local mutations, remote
//! write confirmations, and pushed "entity added" events. A single-slot
//! notification scheduler surfaces failures without ever showing two
//! stale messages at once.

pub mod application;
pub mod domain;
pub mod shared;
pub mod store;

pub use application::ports::RemoteClient;
pub use application::services::{MutationService, NotificationService, SubscriptionService};
pub use domain::{
    CollectionTransition, EntityCollection, EntityDraft, EntityRecord, Notification,
    SubscriptionEvent,
};
pub use shared::{
    CreatePolicy, MutationConfig, NotificationConfig, RemoteError, Result, SubscriptionConfig,
    SyncConfig, SyncError,
};
pub use store::CollectionStore;
