pub mod collection;
pub mod entities;

pub use collection::{CollectionTransition, EntityCollection};
pub use entities::{EntityDraft, EntityRecord, Notification, SubscriptionEvent};
