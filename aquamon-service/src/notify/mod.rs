//! Outbound notification delivery.
//!
//! The monitor raises alerts through the [`NotificationSink`] trait and
//! never learns which transport is behind it. Delivery failures are
//! reported back for logging only; alarm state is committed before
//! dispatch and is never rolled back on a failed send.

mod log;
mod twilio;

pub use log::LogSink;
pub use twilio::{TwilioConfig, TwilioSink};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can arise while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request never completed (connect, timeout, TLS, ...).
    #[error("notification transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The messaging service answered with a non-success status.
    #[error("notification rejected with status {0}")]
    Rejected(u16),
}

/// A capability that delivers a human-readable alert message.
///
/// Implementations may be SMS, webhook, or plain logging; the monitor
/// calls `send` at most once per arm transition.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}
