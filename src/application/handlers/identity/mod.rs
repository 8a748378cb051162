//! Identity handlers: registration, address management, verification.

mod delete_email_address;
mod register_user;
mod set_primary_email;
mod verify_email;

pub use delete_email_address::DeleteEmailAddressHandler;
pub use register_user::{RegisterUserCommand, RegisterUserHandler};
pub use set_primary_email::SetPrimaryEmailHandler;
pub use verify_email::VerifyEmailHandler;
