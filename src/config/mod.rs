//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `PRESSABO`
//! prefix and nested keys use double underscores as separators. There is no
//! ambient global settings object; handlers receive the sections they need.
//!
//! # Example
//!
//! ```no_run
//! use pressabo::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod billing;
mod error;
mod notifications;
mod tokens;

pub use billing::BillingConfig;
pub use error::{ConfigError, ConfigValidationError};
pub use notifications::NotificationConfig;
pub use tokens::TokenConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Token issuance (time-to-live, hourly quota)
    #[serde(default)]
    pub tokens: TokenConfig,

    /// Billing (due dates, renewal window, accounting copy)
    #[serde(default)]
    pub billing: BillingConfig,

    /// Outbound notifications (base URL, sender)
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads variables with the `PRESSABO`
    /// prefix, e.g. `PRESSABO__TOKENS__TTL_HOURS=48` ->
    /// `tokens.ttl_hours = 48`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PRESSABO")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` if any configuration value is
    /// invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.tokens.validate()?;
        self.billing.validate()?;
        self.notifications.validate()?;
        Ok(())
    }
}
