//! Command handlers, one per operation.
//!
//! Each handler is constructed with `Arc<dyn Port>` collaborators and
//! exposes a single `handle` entry point. They are plain callables: any
//! outer surface (HTTP, CLI, cron) wires them up and maps their errors.

pub mod auth;
pub mod catalog;
pub mod identity;
pub mod notifier;
pub mod subscription;
