//! Auth domain - single-use email tokens.
//!
//! Passwordless authentication: a token binds a random 128-bit code to an
//! email address and a purpose. Codes are stored hashed; successful
//! authentication consumes (deletes) the token so it can never be replayed.

mod errors;
mod token;

pub use errors::{AuthError, AuthFailure};
pub use token::{Token, TokenPurpose};
