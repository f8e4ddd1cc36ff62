//! The aquamond daemon.
//!
//! Wires the telemetry subscription, the level monitor, and the HTTP API
//! together and runs until interrupted.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use aquamon_service::api::{self, SharedState};
use aquamon_service::config::Config;
use aquamon_service::monitor::LevelMonitor;
use aquamon_service::notify::{LogSink, NotificationSink, TwilioSink};
use aquamon_service::report::{CannedGenerator, GeminiGenerator, ReportGenerator};
use aquamon_service::telemetry::FirebaseSubscription;
use aquamon_service::tracing::prelude::*;

/// Backpressure bound for readings in flight between the subscription
/// and the monitor.
const READING_CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    aquamon_service::tracing::init();

    let config = Config::from_env()?;
    if config.dev_mode {
        warn!("dev mode enabled");
    }

    let sink: Arc<dyn NotificationSink> = match config.twilio.clone() {
        Some(twilio) => Arc::new(TwilioSink::new(twilio)),
        None => {
            warn!("SMS credentials not configured, alerts will only be logged");
            Arc::new(LogSink)
        }
    };

    let generator: Arc<dyn ReportGenerator> = match config.gemini_api_key.clone() {
        Some(key) => Arc::new(GeminiGenerator::new(key)),
        None => {
            warn!("GEMINI_API_KEY not configured, reports will use canned text");
            Arc::new(CannedGenerator)
        }
    };

    let cancellation = CancellationToken::new();
    let (reading_tx, reading_rx) = mpsc::channel(READING_CHANNEL_CAPACITY);
    let (status_tx, status_rx) = watch::channel(Vec::new());

    let subscription = FirebaseSubscription::new(config.telemetry.clone(), reading_tx);
    let telemetry_task = tokio::spawn(subscription.run(cancellation.child_token()));

    let monitor = LevelMonitor::new(config.monitor.clone(), reading_rx, sink, status_tx);
    let monitor_task = tokio::spawn(monitor.run(cancellation.child_token()));

    let shutdown = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            shutdown.cancel();
        }
    });

    let state = SharedState {
        generator,
        tanks_rx: status_rx,
    };
    let served = api::serve(config.api_addr, state, cancellation.child_token()).await;

    // Server is down, either by shutdown or failure; stop the rest.
    cancellation.cancel();
    let _ = telemetry_task.await;
    let _ = monitor_task.await;

    served?;
    Ok(())
}
