//! Identity domain - User and EmailAddress aggregate.
//!
//! Authentication is token-only: users are created without a usable
//! password. Every user has exactly one primary email address at all times;
//! the primary flip is an atomic repository operation.

mod email_address;
mod errors;
mod user;

pub use email_address::EmailAddress;
pub use errors::IdentityError;
pub use user::User;
