//! Pressabo - Subscription and billing management core
//!
//! This crate implements the domain workflow for a newspaper publisher's
//! subscription service: passwordless token authentication, plan
//! eligibility, the subscription/period/payment lifecycle, and expiration
//! reminders. Presentation, persistence backends, and payment gateways are
//! consumed through ports.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
