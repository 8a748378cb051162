//! Token configuration

use serde::Deserialize;

use super::error::ConfigValidationError;

/// Token issuance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// How long an issued token stays consumable, in hours
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,

    /// Maximum tokens issued per user in any trailing hour
    #[serde(default = "default_issue_limit_per_hour")]
    pub issue_limit_per_hour: u32,

    /// How often a persist-time code collision is retried with a fresh draw
    #[serde(default = "default_generation_attempts")]
    pub generation_attempts: u32,
}

impl TokenConfig {
    /// Validate token configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.ttl_hours < 1 {
            return Err(ConfigValidationError::InvalidTokenTtl);
        }
        if self.issue_limit_per_hour == 0 || self.generation_attempts == 0 {
            return Err(ConfigValidationError::InvalidIssueLimit);
        }
        Ok(())
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            issue_limit_per_hour: default_issue_limit_per_hour(),
            generation_attempts: default_generation_attempts(),
        }
    }
}

fn default_ttl_hours() -> i64 {
    72
}

fn default_issue_limit_per_hour() -> u32 {
    10
}

fn default_generation_attempts() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TokenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.issue_limit_per_hour, 10);
        assert_eq!(config.ttl_hours, 72);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let config = TokenConfig {
            ttl_hours: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_issue_limit_is_rejected() {
        let config = TokenConfig {
            issue_limit_per_hour: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
