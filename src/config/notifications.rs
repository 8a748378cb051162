//! Notification configuration

use serde::Deserialize;

use super::error::ConfigValidationError;

/// Notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Public base URL token links are built from
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl NotificationConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Validate notification configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigValidationError::InvalidBaseUrl);
        }
        if !self.from_email.contains('@') {
            return Err(ConfigValidationError::InvalidSenderEmail);
        }
        Ok(())
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_base_url() -> String {
    "https://abo.pressabo.example".to_string()
}

fn default_from_email() -> String {
    "noreply@pressabo.example".to_string()
}

fn default_from_name() -> String {
    "Pressabo".to_string()
}
