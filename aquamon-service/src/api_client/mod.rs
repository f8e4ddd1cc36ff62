//! HTTP client for the aquamond API.
//!
//! Used by `aquamon-cli` and useful for integration tooling.

pub mod types;

use anyhow::{Result, bail};

use types::{ErrorResponse, ReportRequest, ReportResponse, TankStatus};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Liveness check; returns the server's static response.
    pub async fn health(&self) -> Result<String> {
        let url = format!("{}/api/v0/health", self.base_url);
        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Current per-tank monitor status.
    pub async fn tanks(&self) -> Result<Vec<TankStatus>> {
        let url = format!("{}/api/v0/tanks", self.base_url);
        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Generate a water-quality report for one sensor snapshot.
    pub async fn report(&self, request: &ReportRequest) -> Result<ReportResponse> {
        let url = format!("{}/api/v0/report", self.base_url);
        let response = self.http.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            match response.json::<ErrorResponse>().await {
                Ok(body) => bail!("report request failed ({status}): {}", body.error),
                Err(_) => bail!("report request failed ({status})"),
            }
        }

        Ok(response.json().await?)
    }
}
