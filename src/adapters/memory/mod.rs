//! In-memory reference adapters.
//!
//! Single-process, lock-based implementations of the persistence and
//! notification ports. They back the integration tests and local
//! experiments; they make no durability promises.

mod notification_gateway;
mod plan_repository;
mod subscription_repository;
mod token_repository;
mod user_repository;

pub use notification_gateway::InMemoryNotificationGateway;
pub use plan_repository::InMemoryPlanRepository;
pub use subscription_repository::InMemorySubscriptionRepository;
pub use token_repository::InMemoryTokenRepository;
pub use user_repository::InMemoryUserRepository;
