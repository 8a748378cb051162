//! User aggregate entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Email, Timestamp, UserId, ValidationError};

/// A subscriber account.
///
/// # Invariants
///
/// - `email` mirrors the single primary [`EmailAddress`](super::EmailAddress)
///   and is only updated through the atomic primary-email switch.
/// - Users are never hard-deleted in the normal flow; `is_active = false`
///   locks the account out of token authentication instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Denormalized copy of the primary email address.
    pub email: Email,
    pub is_active: bool,
    /// Staff accounts may confirm payments and manage subscriptions.
    pub is_staff: bool,
    pub created_at: Timestamp,
}

impl User {
    /// Creates a new active, non-staff user.
    ///
    /// There is no password field anywhere: authentication happens
    /// exclusively through single-use email tokens.
    pub fn create(
        id: UserId,
        email: Email,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        if first_name.trim().is_empty() {
            return Err(ValidationError::empty_field("first_name"));
        }
        if last_name.trim().is_empty() {
            return Err(ValidationError::empty_field("last_name"));
        }
        Ok(Self {
            id,
            first_name,
            last_name,
            email,
            is_active: true,
            is_staff: false,
            created_at: now,
        })
    }

    /// Returns the user's full name for notification contexts.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Deactivates the account. One-way in the normal flow.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_email() -> Email {
        Email::new("nora@example.com").unwrap()
    }

    #[test]
    fn create_builds_active_non_staff_user() {
        let user = User::create(UserId::new(), test_email(), "Nora", "Keller", Timestamp::now())
            .unwrap();
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert_eq!(user.email.as_str(), "nora@example.com");
    }

    #[test]
    fn create_rejects_blank_names() {
        assert!(User::create(UserId::new(), test_email(), " ", "Keller", Timestamp::now()).is_err());
        assert!(User::create(UserId::new(), test_email(), "Nora", "", Timestamp::now()).is_err());
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let user = User::create(UserId::new(), test_email(), "Nora", "Keller", Timestamp::now())
            .unwrap();
        assert_eq!(user.full_name(), "Nora Keller");
    }

    #[test]
    fn deactivate_clears_active_flag() {
        let mut user =
            User::create(UserId::new(), test_email(), "Nora", "Keller", Timestamp::now()).unwrap();
        user.deactivate();
        assert!(!user.is_active);
    }
}
