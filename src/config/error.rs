//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Token time-to-live must be at least one hour")]
    InvalidTokenTtl,

    #[error("Token issue limit must be positive")]
    InvalidIssueLimit,

    #[error("Payment due days must be positive")]
    InvalidPaymentDueDays,

    #[error("Renewal window must be positive")]
    InvalidRenewalWindow,

    #[error("Invalid accounting email address")]
    InvalidAccountingEmail,

    #[error("Invalid sender email address")]
    InvalidSenderEmail,

    #[error("Base URL must start with http:// or https://")]
    InvalidBaseUrl,
}
