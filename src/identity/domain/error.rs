//! Error types for identity domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing identity domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The username is empty, too long, or contains whitespace.
    #[error("invalid username '{0}'")]
    InvalidUsername(String),

    /// The password is shorter than the accepted minimum.
    #[error("password must be at least {min} characters long")]
    PasswordTooShort {
        /// Minimum accepted length in characters.
        min: usize,
    },

    /// The password could not be hashed, or a stored hash is malformed.
    #[error("password hashing failed: {0}")]
    PasswordHashing(String),
}

/// Error returned while parsing roles from tokens or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
