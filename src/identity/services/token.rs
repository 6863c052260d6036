//! Signed, expiring identity tokens.
//!
//! Tokens are HS256 JWTs carrying the user identifier and role. They are
//! self-contained: validation checks the signature, issuer, and embedded
//! expiry and never consults a store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::{AuthConfig, MAX_TOKEN_TTL_SECS};
use crate::identity::domain::{Identity, Role, UserId};

/// Clock skew tolerated when checking token expiry, in seconds.
pub const CLOCK_SKEW_LEEWAY_SECS: i64 = 30;

const BEARER_SCHEME: &str = "bearer";

/// Errors returned by the token service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The credential is missing, malformed, expired, or badly signed.
    #[error("invalid token")]
    InvalidToken,

    /// The service configuration cannot produce tokens.
    #[error("token configuration error: {0}")]
    Configuration(String),

    /// Signing a new token failed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Claims embedded in every identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,
    /// Role held by the subject when the token was issued.
    pub role: Role,
    /// Token issuer.
    pub iss: String,
    /// Issued-at time (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Issues and validates identity tokens.
pub struct TokenService<C>
where
    C: Clock + Send + Sync,
{
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
    clock: Arc<C>,
}

impl<C> fmt::Debug for TokenService<C>
where
    C: Clock + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl<C> TokenService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a token service from authentication settings.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Configuration`] when the secret is empty or the
    /// lifetime is zero or longer than [`MAX_TOKEN_TTL_SECS`].
    pub fn new(config: &AuthConfig, clock: Arc<C>) -> Result<Self, TokenError> {
        if config.token_secret.is_empty() {
            return Err(TokenError::Configuration(
                "token secret must not be empty".to_owned(),
            ));
        }
        let ttl = Some(config.token_ttl_secs)
            .filter(|secs| *secs <= MAX_TOKEN_TTL_SECS)
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| {
                TokenError::Configuration(format!(
                    "unsupported token lifetime: {}s",
                    config.token_ttl_secs
                ))
            })?;

        // Expiry is checked against the injected clock, not the system time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            ttl,
            clock,
        })
    }

    /// Issues a token for a user and role.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] when the expiry cannot be represented
    /// or encoding fails.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        let now = self.clock.utc();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing(format!("expiry overflows after {now}")))?;
        let claims = TokenClaims {
            sub: user_id,
            role,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))?;
        debug!(
            user_id = %user_id,
            role = %role,
            expires_at = %expires_at,
            "identity token issued"
        );
        Ok(token)
    }

    /// Validates a token and resolves the caller identity.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidToken`] when the token is malformed,
    /// badly signed, from another issuer, or expired beyond
    /// [`CLOCK_SKEW_LEEWAY_SECS`].
    pub fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |err| {
                debug!(error = %err, "token rejected");
                TokenError::InvalidToken
            },
        )?;
        let claims = data.claims;

        let now = self.clock.utc().timestamp();
        if now > claims.exp.saturating_add(CLOCK_SKEW_LEEWAY_SECS) {
            debug!(user_id = %claims.sub, exp = claims.exp, now, "token expired");
            return Err(TokenError::InvalidToken);
        }

        let expires_at =
            DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or(TokenError::InvalidToken)?;
        Ok(Identity::new(claims.sub, claims.role, expires_at))
    }

    /// Returns the configured token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// # Errors
///
/// Returns [`TokenError::InvalidToken`] when the scheme is not `Bearer` or
/// the token is empty.
pub fn extract_bearer_token(header: &str) -> Result<&str, TokenError> {
    let (scheme, rest) = header
        .trim()
        .split_once(' ')
        .ok_or(TokenError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(TokenError::InvalidToken);
    }
    let token = rest.trim();
    if token.is_empty() {
        return Err(TokenError::InvalidToken);
    }
    Ok(token)
}
