//! Delivery port for rendered notifications.

use async_trait::async_trait;
use thiserror::Error;

use crate::identity::domain::UserId;
use crate::notification::domain::{NotificationMessage, Recipient};

/// Result type for notification delivery.
pub type NotificationSenderResult<T> = Result<T, NotificationSenderError>;

/// Delivers a rendered message to a user.
///
/// Implementations own their transport timeouts; the dispatcher never
/// cancels a send once started.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends `message` to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSenderError::SendFailed`] when delivery fails.
    async fn send(
        &self,
        recipient: &Recipient,
        message: &NotificationMessage,
    ) -> NotificationSenderResult<()>;
}

/// Errors returned by notification senders.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationSenderError {
    /// The transport rejected or failed the delivery.
    #[error("notification delivery to {recipient} failed: {reason}")]
    SendFailed {
        /// Intended recipient.
        recipient: UserId,
        /// Transport diagnostic.
        reason: String,
    },
}
