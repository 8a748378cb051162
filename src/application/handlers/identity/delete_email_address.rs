//! DeleteEmailAddressHandler - removes a secondary address.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{EmailAddressId, UserId};
use crate::domain::identity::IdentityError;
use crate::ports::UserRepository;

/// Handler deleting one of a user's addresses.
///
/// The primary address can never be deleted; switch primaries first.
pub struct DeleteEmailAddressHandler {
    users: Arc<dyn UserRepository>,
}

impl DeleteEmailAddressHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn handle(
        &self,
        user_id: UserId,
        email_address_id: EmailAddressId,
    ) -> Result<(), IdentityError> {
        let address = self
            .users
            .find_email_address(&email_address_id)
            .await?
            .ok_or_else(|| IdentityError::email_address_not_found(email_address_id))?;
        if address.user_id != user_id {
            return Err(IdentityError::not_owned(user_id, email_address_id));
        }
        address.ensure_deletable()?;

        self.users.delete_email_address(&email_address_id).await?;
        info!(%user_id, %email_address_id, "email address deleted");
        Ok(())
    }
}
