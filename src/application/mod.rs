pub mod ports;
pub mod services;

pub use services::{MutationService, NotificationService, SubscriptionService};
