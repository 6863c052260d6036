//! Notification dispatch service.

mod dispatcher;

pub use dispatcher::{DispatchStats, DispatcherWorkers, NotificationDispatcher};
