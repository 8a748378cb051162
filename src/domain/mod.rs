//! Domain layer - entities, value objects, and business rules.

pub mod auth;
pub mod catalog;
pub mod foundation;
pub mod identity;
pub mod subscription;
