//! User accounts, roles, and signed identity tokens.
//!
//! The identity context owns who a caller is and which role they hold:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Token issuing and account services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
