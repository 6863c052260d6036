//! Port contracts for notification delivery.

pub mod sender;

pub use sender::{NotificationSender, NotificationSenderError, NotificationSenderResult};

#[cfg(test)]
pub use sender::MockNotificationSender;
