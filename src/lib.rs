//! Taskboard: core of a multi-user task tracker.
//!
//! Users sign up with a role, log in for a signed bearer token, and then
//! create, read, update, delete, and move tasks through a status workflow.
//! Every request is authenticated from its token, checked against a static
//! role policy, and only then applied. Accepted status changes notify the
//! task's responsible user through a bounded, best-effort dispatcher that
//! never delays or fails the request.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and delivery
//! - **Adapters**: Concrete implementations of ports (in-memory, mock email)
//! - **Services**: Orchestration of domain values through ports
//!
//! # Modules
//!
//! - [`identity`]: Users, roles, password login, and identity tokens
//! - [`policy`]: Role and ownership based permission decisions
//! - [`task`]: Tasks, the status state machine, paging, and the request
//!   pipeline
//! - [`notification`]: Status-change messages and their dispatch
//! - [`config`]: Layered configuration loading
//! - [`telemetry`]: Tracing subscriber setup
//! - [`api`]: HTTP status codes and error bodies

pub mod api;
pub mod config;
pub mod identity;
pub mod notification;
pub mod policy;
pub mod task;
pub mod telemetry;
