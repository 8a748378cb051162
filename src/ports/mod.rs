//! Ports - trait interfaces for external collaborators.
//!
//! Persistence, message dispatch, and the clock are all reached through
//! these narrow contracts; the application layer never sees a concrete
//! backend.

mod clock;
mod notification_gateway;
mod plan_repository;
mod subscription_repository;
mod token_repository;
mod user_repository;

pub use clock::Clock;
pub use notification_gateway::{Notification, NotificationGateway};
pub use plan_repository::PlanRepository;
pub use subscription_repository::SubscriptionRepository;
pub use token_repository::TokenRepository;
pub use user_repository::UserRepository;
