//! Firebase Realtime Database streaming subscription.
//!
//! Uses the RTDB REST streaming protocol: a long-lived GET with
//! `Accept: text/event-stream` that delivers `put`/`patch` frames as the
//! data under the subscribed path changes. Dropped connections are
//! re-established with jittered exponential backoff.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{FieldLookup, Reading, lookup_field};
use crate::error::{Error, Result};
use crate::tracing::prelude::*;

const BACKOFF_INITIAL: Duration = Duration::from_secs(1);
const BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Exponential backoff for reconnection timing.
///
/// Starts at `initial` and doubles after each call to `next_delay()`,
/// capping at `max`. Each returned delay is jittered to [0.5, 1.0) of
/// the nominal value so restarting clients don't reconnect in lockstep.
struct ExponentialBackoff {
    current: Duration,
    initial: Duration,
    max: Duration,
    // Per-process jitter seed. RandomState is seeded from OS randomness
    // at construction, so different processes produce different jitter
    // even when reconnecting at the same wall-clock instant.
    jitter_state: RandomState,
    jitter_step: u64,
}

impl ExponentialBackoff {
    fn new(initial: Duration, max: Duration) -> Self {
        Self {
            current: initial,
            initial,
            max,
            jitter_state: RandomState::new(),
            jitter_step: 0,
        }
    }

    /// Return the next backoff delay (with jitter) and advance the state.
    fn next_delay(&mut self) -> Duration {
        let nominal = self.current;
        self.current = (self.current * 2).min(self.max);

        let mut hasher = self.jitter_state.build_hasher();
        hasher.write_u64(self.jitter_step);
        self.jitter_step = self.jitter_step.wrapping_add(1);
        let hash = hasher.finish();
        let jitter = 0.5 + (hash as f64 / u64::MAX as f64) * 0.5;

        nominal.mul_f64(jitter)
    }

    /// Reset backoff to the initial delay.
    fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Where and what to subscribe to.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Database root, e.g. "https://example.firebaseio.com".
    pub database_url: String,
    /// Path under the root to watch, e.g. "sensorData".
    pub path: String,
    /// Field inside the watched object that carries the level.
    pub field: String,
    /// Optional database secret / ID token appended as `?auth=`.
    pub auth: Option<String>,
}

/// A parsed server-sent event frame.
#[derive(Debug, PartialEq)]
enum StreamEvent {
    /// `put` or `patch`: data changed under `path`.
    Update { path: String, data: Value },
    KeepAlive,
    /// Server revoked the subscription; reconnect.
    Cancel,
    /// Auth credential expired; reconnect (a fresh `auth` param is sent).
    AuthRevoked,
}

#[derive(Deserialize)]
struct UpdatePayload {
    path: String,
    data: Value,
}

/// Parse one `event:`/`data:` frame into a [`StreamEvent`].
///
/// Unknown event names and malformed payloads return `None`.
fn parse_frame(frame: &str) -> Option<StreamEvent> {
    let mut event = None;
    let mut data = None;
    for line in frame.lines() {
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data = Some(rest.trim());
        }
    }

    match event? {
        "put" | "patch" => {
            let payload: UpdatePayload = serde_json::from_str(data?).ok()?;
            Some(StreamEvent::Update {
                path: payload.path,
                data: payload.data,
            })
        }
        "keep-alive" => Some(StreamEvent::KeepAlive),
        "cancel" => Some(StreamEvent::Cancel),
        "auth_revoked" => Some(StreamEvent::AuthRevoked),
        _ => None,
    }
}

/// Streaming subscription that forwards level readings to the monitor.
pub struct FirebaseSubscription {
    config: FirebaseConfig,
    http: reqwest::Client,
    reading_tx: mpsc::Sender<Reading>,
}

impl FirebaseSubscription {
    pub fn new(config: FirebaseConfig, reading_tx: mpsc::Sender<Reading>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            reading_tx,
        }
    }

    fn stream_url(&self) -> String {
        let base = self.config.database_url.trim_end_matches('/');
        let mut url = format!("{base}/{}.json", self.config.path);
        if let Some(auth) = &self.config.auth {
            url.push_str("?auth=");
            url.push_str(auth);
        }
        url
    }

    /// Run the subscription until cancelled, reconnecting as needed.
    pub async fn run(self, cancellation: CancellationToken) {
        info!(path = %self.config.path, field = %self.config.field, "telemetry subscription starting");
        let mut backoff = ExponentialBackoff::new(BACKOFF_INITIAL, BACKOFF_MAX);

        loop {
            if cancellation.is_cancelled() {
                break;
            }

            match self.stream_once(&cancellation, &mut backoff).await {
                Ok(()) => {
                    if cancellation.is_cancelled() {
                        break;
                    }
                    info!("telemetry stream closed by server");
                }
                Err(e) => warn!(error = %e, "telemetry stream failed"),
            }

            let delay = backoff.next_delay();
            debug!(delay_ms = delay.as_millis() as u64, "reconnecting to telemetry stream");
            tokio::select! {
                _ = cancellation.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        trace!("telemetry subscription stopped");
    }

    /// Open the stream and consume frames until it ends or is cancelled.
    async fn stream_once(
        &self,
        cancellation: &CancellationToken,
        backoff: &mut ExponentialBackoff,
    ) -> Result<()> {
        let response = self
            .http
            .get(self.stream_url())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| Error::Telemetry(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Telemetry(format!(
                "subscription request returned {status}"
            )));
        }

        debug!("telemetry stream connected");
        backoff.reset();

        let mut stream = response.bytes_stream();
        let mut buf = String::new();

        loop {
            let chunk = tokio::select! {
                _ = cancellation.cancelled() => return Ok(()),
                chunk = stream.next() => chunk,
            };

            let chunk = match chunk {
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) => return Err(Error::Telemetry(e.to_string())),
                None => return Ok(()),
            };

            buf.push_str(&String::from_utf8_lossy(&chunk));

            // Frames are separated by a blank line.
            while let Some(pos) = buf.find("\n\n") {
                let frame: String = buf.drain(..pos + 2).collect();
                self.handle_frame(frame.trim_end()).await;
            }
        }
    }

    async fn handle_frame(&self, frame: &str) {
        match parse_frame(frame) {
            Some(StreamEvent::Update { path, data }) => {
                match lookup_field(&path, &data, &self.config.field) {
                    FieldLookup::Value(value) => {
                        trace!(%path, value, "level update");
                        let reading = Reading {
                            source: self.config.path.clone(),
                            value,
                        };
                        if self.reading_tx.send(reading).await.is_err() {
                            debug!("reading channel closed");
                        }
                    }
                    FieldLookup::Absent => trace!(%path, "update without monitored field"),
                    FieldLookup::Null => debug!(field = %self.config.field, "monitored field is null"),
                    FieldLookup::NotNumeric(raw) => {
                        warn!(field = %self.config.field, %raw, "ignoring non-numeric reading")
                    }
                }
            }
            Some(StreamEvent::KeepAlive) => trace!("keep-alive"),
            Some(StreamEvent::Cancel) => warn!("subscription cancelled by server"),
            Some(StreamEvent::AuthRevoked) => warn!("subscription auth revoked"),
            None => debug!(%frame, "unrecognized stream frame"),
        }
    }
}
