//! Token store handlers: issue, consume, sweep.

mod consume_token;
mod issue_token;
mod sweep_tokens;

pub use consume_token::ConsumeTokenHandler;
pub use issue_token::{IssueTokenCommand, IssueTokenHandler, IssuedToken};
pub use sweep_tokens::SweepExpiredTokensHandler;
