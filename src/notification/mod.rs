//! Status-change notifications.
//!
//! Accepted transitions produce a [`NotificationEvent`]. Once the recipient's
//! username is resolved it is wrapped in a
//! [`Notification`](domain::Notification) and handed to the
//! [`NotificationDispatcher`](services::NotificationDispatcher), which queues
//! it on a bounded channel and returns at once. Independent workers render
//! the message and deliver it through a [`NotificationSender`] port.
//! Delivery is best effort: failures are logged and counted, never retried,
//! and never reported back to the request that caused them.
//!
//! [`NotificationEvent`]: crate::task::domain::NotificationEvent
//! [`NotificationSender`]: ports::NotificationSender

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
