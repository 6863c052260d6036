//! Status-change events addressed to a named recipient.

use serde::{Deserialize, Serialize};

use crate::identity::domain::{UserId, Username};
use crate::task::domain::NotificationEvent;

/// User a notification is delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Recipient identifier.
    pub user_id: UserId,
    /// Login name, used in the greeting and the mail address.
    pub username: Username,
}

/// Queued unit of work for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// The accepted status change.
    pub event: NotificationEvent,
    /// The event's recipient with their username resolved.
    pub recipient: Recipient,
}

impl Notification {
    /// Addresses `event` to its recipient, known by `username`.
    #[must_use]
    pub const fn new(event: NotificationEvent, username: Username) -> Self {
        let recipient = Recipient {
            user_id: event.recipient_user_id,
            username,
        };
        Self { event, recipient }
    }
}
