//! SetPrimaryEmailHandler - atomic primary-address switch.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{EmailAddressId, ErrorCode, UserId};
use crate::domain::identity::IdentityError;
use crate::ports::UserRepository;

/// Handler switching which of a user's addresses is primary.
///
/// The flip itself is one atomic repository operation; no observer ever
/// sees zero or two primaries, and the denormalized `user.email` moves with
/// the flag.
pub struct SetPrimaryEmailHandler {
    users: Arc<dyn UserRepository>,
}

impl SetPrimaryEmailHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn handle(
        &self,
        user_id: UserId,
        email_address_id: EmailAddressId,
    ) -> Result<(), IdentityError> {
        self.users
            .set_primary_email(&user_id, &email_address_id)
            .await
            .map_err(|err| match err.code {
                ErrorCode::UserNotFound => IdentityError::user_not_found(user_id),
                ErrorCode::EmailAddressNotFound => {
                    IdentityError::not_owned(user_id, email_address_id)
                }
                _ => IdentityError::from(err),
            })?;
        info!(%user_id, %email_address_id, "primary email switched");
        Ok(())
    }
}
