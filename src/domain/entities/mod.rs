pub mod entity;
pub mod notification;

pub use entity::{EntityDraft, EntityRecord, SubscriptionEvent};
pub use notification::Notification;
