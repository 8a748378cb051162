//! Email address value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Validated email address, stored lowercase.
///
/// Validation is deliberately minimal (one `@`, non-empty local part and
/// domain with a dot); deliverability is the notification gateway's problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parses and normalizes an email address.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        let (local, domain) = value
            .split_once('@')
            .ok_or_else(|| ValidationError::invalid_format("email", "missing @ symbol"))?;
        if local.is_empty() {
            return Err(ValidationError::invalid_format("email", "empty local part"));
        }
        if domain.is_empty() || !domain.contains('.') || domain.contains('@') {
            return Err(ValidationError::invalid_format("email", "invalid domain"));
        }
        Ok(Self(value))
    }

    /// Returns the full address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain part, used for plan eligibility allow-lists.
    pub fn domain(&self) -> &str {
        self.0.rsplit('@').next().unwrap_or("")
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_lowercases_valid_address() {
        let email = Email::new("Reader@Example.COM").unwrap();
        assert_eq!(email.as_str(), "reader@example.com");
    }

    #[test]
    fn exposes_domain_part() {
        let email = Email::new("sofia@student.example.edu").unwrap();
        assert_eq!(email.domain(), "student.example.edu");
    }

    #[test]
    fn rejects_empty_string() {
        assert!(matches!(
            Email::new("  "),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn rejects_missing_at_symbol() {
        assert!(Email::new("not-an-address").is_err());
    }

    #[test]
    fn rejects_empty_local_part() {
        assert!(Email::new("@example.com").is_err());
    }

    #[test]
    fn rejects_dotless_domain() {
        assert!(Email::new("reader@localhost").is_err());
    }
}
