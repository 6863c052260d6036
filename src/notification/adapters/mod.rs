//! Adapter implementations for notification ports.

mod mock_email;

pub use mock_email::{MockEmailSender, SentEmail};
