//! Tasks, their status state machine, and paged listings.
//!
//! A task moves through a fixed set of statuses along the edges listed in
//! [`domain::ALLOWED_TRANSITIONS`]. Accepted transitions are computed as
//! values and stored with a compare-and-swap on the expected current status,
//! so two racing requests can never both win. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
