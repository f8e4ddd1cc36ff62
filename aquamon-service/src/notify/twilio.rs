//! SMS delivery via the Twilio Messages API.

use async_trait::async_trait;
use serde::Deserialize;

use super::{NotificationSink, NotifyError};
use crate::tracing::prelude::*;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Credentials and phone numbers for one Twilio messaging account.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sending number, E.164 (e.g. "+15551230000").
    pub from: String,
    /// Receiving number, E.164.
    pub to: String,
}

/// The subset of the Messages API response we care about.
#[derive(Debug, Deserialize)]
struct MessageCreated {
    sid: String,
}

/// [`NotificationSink`] backed by Twilio SMS.
pub struct TwilioSink {
    http: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioSink {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl NotificationSink for TwilioSink {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{TWILIO_API_BASE}/Accounts/{}/Messages.json",
            self.config.account_sid
        );
        let params = [
            ("Body", message),
            ("From", self.config.from.as_str()),
            ("To", self.config.to.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Twilio rejected message");
            return Err(NotifyError::Rejected(status.as_u16()));
        }

        match response.json::<MessageCreated>().await {
            Ok(created) => info!(sid = %created.sid, "SMS sent"),
            // Delivery succeeded even if the receipt didn't parse.
            Err(e) => debug!(error = %e, "could not parse Twilio receipt"),
        }

        Ok(())
    }
}
