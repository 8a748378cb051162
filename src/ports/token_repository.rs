//! Token repository port.

use async_trait::async_trait;

use crate::domain::auth::Token;
use crate::domain::foundation::{DomainError, EmailAddressId, Timestamp, TokenId};

/// Repository port for single-use authentication tokens.
///
/// Implementations must enforce a uniqueness constraint on `code_hash`;
/// the issuing handler retries with a fresh code on conflict.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Inserts a new token.
    ///
    /// # Errors
    ///
    /// - `CodeConflict` if another token already has this `code_hash`
    /// - `StorageError` on persistence failure
    async fn insert(&self, token: &Token) -> Result<(), DomainError>;

    /// Finds a token by the hash of its plaintext code.
    ///
    /// Returns `None` if not found. This is the only lookup consumption
    /// needs; plaintext codes are never stored.
    async fn find_by_code_hash(&self, code_hash: &str) -> Result<Option<Token>, DomainError>;

    /// Updates an existing token (e.g. marking it sent).
    async fn update(&self, token: &Token) -> Result<(), DomainError>;

    /// Deletes a token. Consumption deletes; a replayed code then simply
    /// finds nothing.
    async fn delete(&self, id: &TokenId) -> Result<(), DomainError>;

    /// Counts tokens created at or after `since` for any of the given
    /// addresses.
    ///
    /// The issuance quota is per user; the caller passes all of the user's
    /// address ids.
    async fn count_issued_since(
        &self,
        email_address_ids: &[EmailAddressId],
        since: Timestamp,
    ) -> Result<u32, DomainError>;

    /// Deletes every token whose validity window has passed.
    ///
    /// Returns how many were removed. Idempotent.
    async fn delete_expired(&self, now: Timestamp) -> Result<u64, DomainError>;
}
