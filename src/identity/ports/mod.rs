//! Port contracts for user account storage.

pub mod repository;

pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult};
