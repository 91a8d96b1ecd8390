pub mod mutation_service;
pub mod notification_service;
pub mod subscription_service;

pub use mutation_service::MutationService;
pub use notification_service::NotificationService;
pub use subscription_service::SubscriptionService;
