//! Password-flow authentication: credential checks, token issuance and
//! bearer-token identity resolution.

pub mod identity;
pub mod password;
pub mod token;

use thiserror::Error;

pub use identity::{authenticate, CurrentUser, UserLookup};
pub use token::TokenService;

/// Authentication failures. The `Display` text is sent to clients verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    IncorrectCredentials,
    #[error("Not authenticated")]
    MissingCredentials,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error("Inactive user")]
    InactiveUser,
}
