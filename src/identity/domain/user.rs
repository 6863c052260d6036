//! User account aggregate.

use super::{PasswordDigest, Role, UserId, Username};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Registered user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    role: Role,
    password: PasswordDigest,
    created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user account.
    #[must_use]
    pub fn new(
        username: Username,
        role: Role,
        password: PasswordDigest,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: UserId::new(),
            username,
            role,
            password,
            created_at: clock.utc(),
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the login name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the role held by the user.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the stored password digest.
    #[must_use]
    pub const fn password(&self) -> &PasswordDigest {
        &self.password
    }

    /// Returns the account creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
