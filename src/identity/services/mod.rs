//! Application services for identity tokens and user accounts.

mod accounts;
mod token;

pub use accounts::{AccessToken, AccountError, AccountService, SignUpRequest};
pub use token::{CLOCK_SKEW_LEEWAY_SECS, TokenClaims, TokenError, TokenService, extract_bearer_token};
