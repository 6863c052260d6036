//! Service layer for user sign-up and password login.

use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::{TokenError, TokenService};
use crate::identity::{
    domain::{IdentityDomainError, PasswordDigest, Role, User, Username},
    ports::{UserRepository, UserRepositoryError},
};

/// Request payload for registering a user.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SignUpRequest {
    username: String,
    password: String,
    role: Role,
}

impl SignUpRequest {
    /// Creates a sign-up request.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
        }
    }
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Bearer token returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Signed identity token.
    pub access_token: String,
    /// Token scheme; always `bearer`.
    pub token_type: String,
}

impl AccessToken {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_owned(),
        }
    }
}

/// Service-level errors for account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
    /// Token issuing failed.
    #[error(transparent)]
    Token(#[from] TokenError),
    /// Unknown username or wrong password.
    #[error("incorrect username or password")]
    InvalidCredentials,
}

/// Result type for account service operations.
pub type AccountResult<T> = Result<T, AccountError>;

/// Account registration and login service.
pub struct AccountService<U, C>
where
    U: UserRepository,
    C: Clock + Send + Sync,
{
    users: Arc<U>,
    tokens: Arc<TokenService<C>>,
    clock: Arc<C>,
}

impl<U, C> Clone for AccountService<U, C>
where
    U: UserRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            tokens: Arc::clone(&self.tokens),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<U, C> AccountService<U, C>
where
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new account service.
    #[must_use]
    pub const fn new(users: Arc<U>, tokens: Arc<TokenService<C>>, clock: Arc<C>) -> Self {
        Self {
            users,
            tokens,
            clock,
        }
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Domain`] for an invalid username or short
    /// password and [`AccountError::Repository`] when the username is taken.
    pub async fn sign_up(&self, request: SignUpRequest) -> AccountResult<User> {
        let username = Username::new(request.username)?;
        let digest = PasswordDigest::derive(&request.password)?;
        let user = User::new(username, request.role, digest, &*self.clock);
        self.users.store(&user).await?;
        info!(
            user_id = %user.id(),
            username = %user.username(),
            role = %user.role(),
            "user registered"
        );
        Ok(user)
    }

    /// Authenticates a user by password and issues an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] when the username is
    /// unknown or the password does not match.
    pub async fn login(&self, username: &str, password: &str) -> AccountResult<AccessToken> {
        let Ok(name) = Username::new(username) else {
            return Err(AccountError::InvalidCredentials);
        };
        let Some(user) = self.users.find_by_username(&name).await? else {
            debug!(username = %name, "login rejected: unknown user");
            return Err(AccountError::InvalidCredentials);
        };
        if !user.password().verify(password) {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id(), user.role())?;
        Ok(AccessToken::bearer(token))
    }
}
