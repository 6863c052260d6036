//! Argon2id password hashes.

use super::IdentityDomainError;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use std::fmt;
use uuid::Uuid;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Argon2id hash of a password in PHC string form (`$argon2id$v=19$...`).
///
/// The plain-text password is never stored. `Debug` output omits the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    phc: String,
}

impl PasswordDigest {
    /// Hashes a new password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::PasswordTooShort`] when the password has
    /// fewer than [`MIN_PASSWORD_LENGTH`] characters and
    /// [`IdentityDomainError::PasswordHashing`] when hashing fails.
    pub fn derive(password: &str) -> Result<Self, IdentityDomainError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(IdentityDomainError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes()).map_err(hashing_error)?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(hashing_error)?;
        Ok(Self {
            phc: hash.to_string(),
        })
    }

    /// Restores a hash from its persisted PHC string.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::PasswordHashing`] when the string is not
    /// a valid PHC hash.
    pub fn from_phc(stored: impl Into<String>) -> Result<Self, IdentityDomainError> {
        let phc = stored.into();
        PasswordHash::new(&phc).map_err(hashing_error)?;
        Ok(Self { phc })
    }

    /// Returns the PHC string for persistence.
    #[must_use]
    pub fn as_phc(&self) -> &str {
        &self.phc
    }

    /// Checks a candidate password against this hash.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        PasswordHash::new(&self.phc).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

fn hashing_error(err: argon2::password_hash::Error) -> IdentityDomainError {
    IdentityDomainError::PasswordHashing(err.to_string())
}
