//! Notification message model.

mod message;
mod notice;

pub use message::{NotificationMessage, RenderError, render_message};
pub use notice::{Notification, Recipient};
