//! User repository port.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Email, EmailAddressId, Timestamp, UserId};
use crate::domain::identity::{EmailAddress, User};

/// Repository port for users and their email addresses.
///
/// Implementations must ensure:
/// - process-wide uniqueness of email addresses
/// - exactly one primary address per user (`set_primary_email` is atomic)
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user together with their primary address in one atomic
    /// operation. A user without a primary address must never be
    /// observable.
    ///
    /// # Errors
    ///
    /// - `EmailTaken` if the address is already in use
    /// - `StorageError` on persistence failure
    async fn create_with_primary_email(
        &self,
        user: &User,
        email_address: &EmailAddress,
    ) -> Result<(), DomainError>;

    /// Finds a user by id. Returns `None` if not found.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Updates an existing user.
    async fn update(&self, user: &User) -> Result<(), DomainError>;

    /// Adds a secondary address for an existing user.
    ///
    /// # Errors
    ///
    /// - `EmailTaken` if the address is already in use
    async fn add_email_address(&self, email_address: &EmailAddress) -> Result<(), DomainError>;

    /// Finds an address record by id. Returns `None` if not found.
    async fn find_email_address(
        &self,
        id: &EmailAddressId,
    ) -> Result<Option<EmailAddress>, DomainError>;

    /// Finds an address record by the address itself.
    async fn find_email_address_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<EmailAddress>, DomainError>;

    /// All address records belonging to a user.
    async fn email_addresses_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EmailAddress>, DomainError>;

    /// Updates an existing address record (e.g. setting `verified_at`).
    async fn update_email_address(&self, email_address: &EmailAddress)
        -> Result<(), DomainError>;

    /// Atomically makes the given address the user's primary: clears the
    /// old primary flag, sets the new one, and refreshes the denormalized
    /// `user.email`. Between those writes no observer may see zero or two
    /// primaries.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `EmailAddressNotFound` if either side is missing
    async fn set_primary_email(
        &self,
        user_id: &UserId,
        email_address_id: &EmailAddressId,
    ) -> Result<(), DomainError>;

    /// Deletes a secondary address. The caller enforces the primary guard
    /// beforehand.
    async fn delete_email_address(&self, id: &EmailAddressId) -> Result<(), DomainError>;

    /// Domains of the user's verified addresses, optionally restricted to
    /// verifications at or after `verified_since`.
    async fn verified_domains(
        &self,
        user_id: &UserId,
        verified_since: Option<Timestamp>,
    ) -> Result<HashSet<String>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn UserRepository) {}
    }
}
