//! Token entity and code generation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::foundation::{EmailAddressId, Timestamp, TokenId};

/// What a token authorizes once consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Log an existing user in.
    Login,
    /// Complete a signup started from a subscription form.
    Signup,
    /// Verify ownership of an email address.
    Verification,
}

impl TokenPurpose {
    /// Returns the string representation of the purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Login => "login",
            TokenPurpose::Signup => "signup",
            TokenPurpose::Verification => "verification",
        }
    }

    /// Notification template dispatched when a token of this purpose is sent.
    pub fn template_id(&self) -> &'static str {
        match self {
            TokenPurpose::Login => "token_login",
            TokenPurpose::Signup => "token_signup",
            TokenPurpose::Verification => "token_verification",
        }
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single-use authentication credential.
///
/// Only the SHA-256 digest of the code is stored; the plaintext exists once,
/// in the message sent to the subscriber. Lookup hashes the presented code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    /// Foreign reference; the token does not own the address.
    pub email_address_id: EmailAddressId,
    pub purpose: TokenPurpose,
    /// SHA-256 hex digest of the plaintext code. Unique.
    pub code_hash: String,
    pub valid_until: Timestamp,
    /// Set once the token has been dispatched.
    pub sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Token {
    /// Generates a fresh token, returning it with the plaintext code.
    ///
    /// The code is a 128-bit random value rendered as 32 hex characters;
    /// collisions are negligible, and the persist layer retries with a new
    /// generation on a uniqueness conflict anyway.
    pub fn generate(
        email_address_id: EmailAddressId,
        purpose: TokenPurpose,
        now: Timestamp,
        ttl_hours: i64,
    ) -> (Self, String) {
        let plaintext = Uuid::new_v4().simple().to_string();
        let token = Self {
            id: TokenId::new(),
            email_address_id,
            purpose,
            code_hash: Self::hash_code(&plaintext),
            valid_until: now.add_hours(ttl_hours),
            sent_at: None,
            created_at: now,
        };
        (token, plaintext)
    }

    /// Hashes a plaintext code the way it is stored.
    pub fn hash_code(plaintext: &str) -> String {
        format!("{:x}", Sha256::digest(plaintext.as_bytes()))
    }

    /// True while the token may still be consumed.
    pub fn is_valid(&self, now: Timestamp) -> bool {
        now <= self.valid_until
    }

    /// True once the validity window has passed.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        !self.is_valid(now)
    }

    /// Marks the token as dispatched.
    pub fn mark_sent(&mut self, now: Timestamp) {
        self.sent_at = Some(now);
    }

    /// Builds the link a recipient clicks, e.g.
    /// `https://host.tld/auth/token/<code>/`.
    pub fn url(base_url: &str, plaintext_code: &str) -> String {
        format!("{}/auth/token/{}/", base_url.trim_end_matches('/'), plaintext_code)
    }
}
