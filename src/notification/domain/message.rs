//! Rendering status-change events into messages.

use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Notification;

const SUBJECT_TEMPLATE: &str = "Task '{{ title }}' status updated";
const BODY_TEMPLATE: &str = "Dear {{ username }},\n\nThe status of the task '{{ title }}' \
has been changed from {{ old_status }} to {{ new_status }}.";

/// Error returned when a message template cannot be rendered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render notification {part}: {reason}")]
pub struct RenderError {
    /// Which part of the message failed.
    pub part: &'static str,
    /// Renderer diagnostic.
    pub reason: String,
}

/// Rendered notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

/// Renders the message sent for a status-change notification.
///
/// # Errors
///
/// Returns [`RenderError`] when a template fails to render.
pub fn render_message(notification: &Notification) -> Result<NotificationMessage, RenderError> {
    let event = &notification.event;
    let environment = Environment::new();
    let values = context! {
        username => notification.recipient.username.as_str(),
        title => event.task_title.as_str(),
        old_status => event.old_status.as_str(),
        new_status => event.new_status.as_str(),
    };
    let subject = environment
        .render_str(SUBJECT_TEMPLATE, &values)
        .map_err(|error| RenderError {
            part: "subject",
            reason: error.to_string(),
        })?;
    let body = environment
        .render_str(BODY_TEMPLATE, &values)
        .map_err(|error| RenderError {
            part: "body",
            reason: error.to_string(),
        })?;
    Ok(NotificationMessage { subject, body })
}
