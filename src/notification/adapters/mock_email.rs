//! Mock email sender.
//!
//! Nothing leaves the process: each message is logged and appended to an
//! in-memory outbox. The sender can be switched into a failing mode to
//! exercise delivery-failure handling.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::info;

use crate::identity::domain::UserId;
use crate::notification::{
    domain::{NotificationMessage, Recipient},
    ports::{NotificationSender, NotificationSenderError, NotificationSenderResult},
};

const DEFAULT_MAIL_DOMAIN: &str = "example.com";

/// Email accepted by the mock sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient user.
    pub recipient: UserId,
    /// Address the email would have been sent to.
    pub to: String,
    /// Rendered message.
    pub message: NotificationMessage,
}

/// Logging, recording email sender with simulated failures.
#[derive(Debug, Clone)]
pub struct MockEmailSender {
    domain: String,
    outbox: Arc<RwLock<Vec<SentEmail>>>,
    failing: Arc<AtomicBool>,
    delivered: Arc<Notify>,
}

impl Default for MockEmailSender {
    fn default() -> Self {
        Self {
            domain: DEFAULT_MAIL_DOMAIN.to_owned(),
            outbox: Arc::default(),
            failing: Arc::default(),
            delivered: Arc::default(),
        }
    }
}

impl MockEmailSender {
    /// Creates a sender that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sender that rejects every message.
    #[must_use]
    pub fn failing() -> Self {
        let sender = Self::default();
        sender.set_failing(true);
        sender
    }

    /// Switches simulated failures on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a copy of every accepted email, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<SentEmail> {
        self.outbox
            .read()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    /// Waits until at least `count` emails were accepted or `timeout`
    /// elapses, then returns the outbox.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<SentEmail> {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.delivered.notified();
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.sent();
            }
        }
    }

    fn address_for(&self, recipient: &Recipient) -> String {
        format!("{}@{}", recipient.username, self.domain)
    }
}

#[async_trait]
impl NotificationSender for MockEmailSender {
    async fn send(
        &self,
        recipient: &Recipient,
        message: &NotificationMessage,
    ) -> NotificationSenderResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationSenderError::SendFailed {
                recipient: recipient.user_id,
                reason: "simulated send failure".to_owned(),
            });
        }

        let to = self.address_for(recipient);
        info!(to = %to, subject = %message.subject, "sending email");
        let mut outbox = self
            .outbox
            .write()
            .map_err(|err| NotificationSenderError::SendFailed {
                recipient: recipient.user_id,
                reason: err.to_string(),
            })?;
        outbox.push(SentEmail {
            recipient: recipient.user_id,
            to,
            message: message.clone(),
        });
        drop(outbox);
        self.delivered.notify_waiters();
        Ok(())
    }
}
