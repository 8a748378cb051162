//! Email address entity, owned by a user.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Email, EmailAddressId, Timestamp, UserId};

use super::IdentityError;

/// One email address belonging to a user.
///
/// # Invariants
///
/// - `email` is unique process-wide (enforced by the repository).
/// - Exactly one address per user has `is_primary = true` at any observation
///   point; the flip is a single atomic repository operation.
/// - Verification is one-way: `verified_at` goes from unset to set, never
///   back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub id: EmailAddressId,
    pub user_id: UserId,
    pub email: Email,
    pub is_primary: bool,
    pub verified_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl EmailAddress {
    /// Creates a new unverified address.
    pub fn new(
        id: EmailAddressId,
        user_id: UserId,
        email: Email,
        is_primary: bool,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            email,
            is_primary,
            verified_at: None,
            created_at: now,
        }
    }

    /// True once the address has been verified.
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }

    /// True if the address was verified within the trailing window.
    ///
    /// Used by the "recently verified" anti-staleness policy for plan
    /// eligibility.
    pub fn verified_within(&self, now: Timestamp, days: i64) -> bool {
        match self.verified_at {
            Some(at) => at >= now.minus_days(days),
            None => false,
        }
    }

    /// Marks the address verified.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyVerified` on a second attempt; the transition is
    /// one-way.
    pub fn verify(&mut self, now: Timestamp) -> Result<(), IdentityError> {
        if self.verified_at.is_some() {
            return Err(IdentityError::already_verified(self.id));
        }
        self.verified_at = Some(now);
        Ok(())
    }

    /// Checks that this address may be deleted.
    ///
    /// # Errors
    ///
    /// Returns `PrimaryEmailUndeletable` while `is_primary` is set; the user
    /// must switch primaries first.
    pub fn ensure_deletable(&self) -> Result<(), IdentityError> {
        if self.is_primary {
            return Err(IdentityError::primary_undeletable(self.id));
        }
        Ok(())
    }
}
