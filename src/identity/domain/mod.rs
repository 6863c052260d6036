//! Domain model for users, roles, and resolved caller identities.

mod error;
mod ids;
mod identity;
mod password;
mod role;
mod user;

pub use error::{IdentityDomainError, ParseRoleError};
pub use identity::Identity;
pub use ids::{UserId, Username};
pub use password::{MIN_PASSWORD_LENGTH, PasswordDigest};
pub use role::Role;
pub use user::User;
