//! Billing configuration

use serde::Deserialize;

use super::error::ConfigValidationError;

/// Billing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Days a fresh invoice stays due after creation
    #[serde(default = "default_payment_due_days")]
    pub payment_due_days: i64,

    /// Days before expiry in which renewal is allowed
    #[serde(default = "default_renewal_window_days")]
    pub renewal_window_days: i64,

    /// Address receiving a copy of every issued invoice
    #[serde(default = "default_accounting_email")]
    pub accounting_email: String,
}

impl BillingConfig {
    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.payment_due_days < 1 {
            return Err(ConfigValidationError::InvalidPaymentDueDays);
        }
        if self.renewal_window_days < 1 {
            return Err(ConfigValidationError::InvalidRenewalWindow);
        }
        if !self.accounting_email.contains('@') {
            return Err(ConfigValidationError::InvalidAccountingEmail);
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            payment_due_days: default_payment_due_days(),
            renewal_window_days: default_renewal_window_days(),
            accounting_email: default_accounting_email(),
        }
    }
}

fn default_payment_due_days() -> i64 {
    30
}

fn default_renewal_window_days() -> i64 {
    30
}

fn default_accounting_email() -> String {
    "accounting@pressabo.example".to_string()
}
