//! Log-only notification sink for development.

use async_trait::async_trait;

use super::{NotificationSink, NotifyError};
use crate::tracing::prelude::*;

/// Writes the alert to the log instead of delivering it.
///
/// Used when SMS credentials are absent and dev mode is enabled, so the
/// monitor can be exercised end-to-end without a messaging account.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        info!(%message, "alert (log sink)");
        Ok(())
    }
}
