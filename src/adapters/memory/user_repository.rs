//! In-memory user repository.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    DomainError, Email, EmailAddressId, ErrorCode, Timestamp, UserId,
};
use crate::domain::identity::{EmailAddress, User};
use crate::ports::UserRepository;

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    addresses: HashMap<EmailAddressId, EmailAddress>,
}

impl State {
    fn email_in_use(&self, email: &Email) -> bool {
        self.addresses.values().any(|a| &a.email == email)
    }
}

/// Lock-based store for users and their addresses.
///
/// One lock guards both maps so the multi-record operations
/// (`create_with_primary_email`, `set_primary_email`) are atomic.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_with_primary_email(
        &self,
        user: &User,
        email_address: &EmailAddress,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.email_in_use(&email_address.email) {
            return Err(DomainError::new(
                ErrorCode::EmailTaken,
                "Email address already in use",
            ));
        }
        state.users.insert(user.id, user.clone());
        state
            .addresses
            .insert(email_address.id, email_address.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user.id) {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn add_email_address(&self, email_address: &EmailAddress) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.email_in_use(&email_address.email) {
            return Err(DomainError::new(
                ErrorCode::EmailTaken,
                "Email address already in use",
            ));
        }
        state
            .addresses
            .insert(email_address.id, email_address.clone());
        Ok(())
    }

    async fn find_email_address(
        &self,
        id: &EmailAddressId,
    ) -> Result<Option<EmailAddress>, DomainError> {
        Ok(self.state.read().await.addresses.get(id).cloned())
    }

    async fn find_email_address_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<EmailAddress>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .addresses
            .values()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn email_addresses_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EmailAddress>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .addresses
            .values()
            .filter(|a| &a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_email_address(
        &self,
        email_address: &EmailAddress,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.addresses.contains_key(&email_address.id) {
            return Err(DomainError::new(
                ErrorCode::EmailAddressNotFound,
                "Email address not found",
            ));
        }
        state
            .addresses
            .insert(email_address.id, email_address.clone());
        Ok(())
    }

    async fn set_primary_email(
        &self,
        user_id: &UserId,
        email_address_id: &EmailAddressId,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;

        let new_primary = match state.addresses.get(email_address_id) {
            Some(address) if &address.user_id == user_id => address.clone(),
            _ => {
                return Err(DomainError::new(
                    ErrorCode::EmailAddressNotFound,
                    "Email address not found for user",
                ))
            }
        };
        if !state.users.contains_key(user_id) {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }

        for address in state.addresses.values_mut() {
            if &address.user_id == user_id {
                address.is_primary = address.id == *email_address_id;
            }
        }
        if let Some(user) = state.users.get_mut(user_id) {
            user.email = new_primary.email;
        }
        Ok(())
    }

    async fn delete_email_address(&self, id: &EmailAddressId) -> Result<(), DomainError> {
        self.state.write().await.addresses.remove(id);
        Ok(())
    }

    async fn verified_domains(
        &self,
        user_id: &UserId,
        verified_since: Option<Timestamp>,
    ) -> Result<HashSet<String>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .addresses
            .values()
            .filter(|a| &a.user_id == user_id)
            .filter(|a| match (a.verified_at, verified_since) {
                (Some(at), Some(since)) => at >= since,
                (Some(_), None) => true,
                (None, _) => false,
            })
            .map(|a| a.email.domain().to_string())
            .collect())
    }
}
