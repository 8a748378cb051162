//! In-memory token repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::auth::Token;
use crate::domain::foundation::{
    DomainError, EmailAddressId, ErrorCode, Timestamp, TokenId,
};
use crate::ports::TokenRepository;

/// Lock-based token store keyed by id, with a uniqueness check on
/// `code_hash`.
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    tokens: RwLock<HashMap<TokenId, Token>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, for assertions.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn insert(&self, token: &Token) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;
        if tokens.values().any(|t| t.code_hash == token.code_hash) {
            return Err(DomainError::new(
                ErrorCode::CodeConflict,
                "Token code hash already exists",
            ));
        }
        tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn find_by_code_hash(&self, code_hash: &str) -> Result<Option<Token>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.code_hash == code_hash).cloned())
    }

    async fn update(&self, token: &Token) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;
        if !tokens.contains_key(&token.id) {
            return Err(DomainError::new(ErrorCode::TokenNotFound, "Token not found"));
        }
        tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn delete(&self, id: &TokenId) -> Result<(), DomainError> {
        self.tokens.write().await.remove(id);
        Ok(())
    }

    async fn count_issued_since(
        &self,
        email_address_ids: &[EmailAddressId],
        since: Timestamp,
    ) -> Result<u32, DomainError> {
        let tokens = self.tokens.read().await;
        let count = tokens
            .values()
            .filter(|t| email_address_ids.contains(&t.email_address_id))
            .filter(|t| t.created_at >= since)
            .count();
        Ok(count as u32)
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.is_valid(now));
        Ok((before - tokens.len()) as u64)
    }
}
