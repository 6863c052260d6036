//! Resolved caller identity.

use super::{Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller identity resolved from a validated token.
///
/// Immutable once issued; it stops being obtainable once the token expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_id: UserId,
    role: Role,
    expires_at: DateTime<Utc>,
}

impl Identity {
    /// Creates an identity value.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            role,
            expires_at,
        }
    }

    /// Returns the authenticated user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the role carried by the token.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the token expiry timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
