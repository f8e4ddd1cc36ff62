//! The monitor task: consumes level readings, drives the per-source
//! alarms, and dispatches notifications.
//!
//! Readings are processed one at a time in arrival order; alarm state is
//! committed synchronously at decision time, while the actual transport
//! call runs as a detached task whose outcome is only logged. A slow or
//! failing delivery therefore never blocks the next reading, and a
//! failed delivery never rolls back the armed state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::config::MonitorConfig;
use crate::api_client::types::TankStatus;
use crate::notify::NotificationSink;
use crate::telemetry::Reading;
use crate::tracing::prelude::*;
use crate::types::{AlarmStatus, ThresholdAlarm};

pub struct LevelMonitor {
    config: MonitorConfig,
    /// One alarm per source, created on first reading. Sources are
    /// independent; a breach in one never suppresses another.
    alarms: HashMap<String, ThresholdAlarm>,
    reading_rx: mpsc::Receiver<Reading>,
    sink: Arc<dyn NotificationSink>,
    status_tx: watch::Sender<Vec<TankStatus>>,
    last_levels: HashMap<String, f64>,
}

impl LevelMonitor {
    pub fn new(
        config: MonitorConfig,
        reading_rx: mpsc::Receiver<Reading>,
        sink: Arc<dyn NotificationSink>,
        status_tx: watch::Sender<Vec<TankStatus>>,
    ) -> Self {
        Self {
            config,
            alarms: HashMap::new(),
            reading_rx,
            sink,
            status_tx,
            last_levels: HashMap::new(),
        }
    }

    /// Run until cancelled or the reading channel closes.
    pub async fn run(mut self, cancellation: CancellationToken) {
        info!(
            threshold = self.config.threshold,
            field = %self.config.field,
            "level monitor started"
        );

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => break,
                maybe = self.reading_rx.recv() => {
                    match maybe {
                        Some(reading) => self.handle_reading(reading),
                        None => {
                            debug!("reading channel closed");
                            break;
                        }
                    }
                }
            }
        }

        trace!("level monitor stopped");
    }

    fn handle_reading(&mut self, reading: Reading) {
        if !reading.value.is_finite() {
            warn!(source = %reading.source, value = reading.value, "ignoring non-finite reading");
            return;
        }

        let alarm = self
            .alarms
            .entry(reading.source.clone())
            .or_insert_with(|| ThresholdAlarm::new(self.config.threshold));

        match alarm.observe(reading.value) {
            AlarmStatus::Raised => {
                info!(
                    source = %reading.source,
                    level = reading.value,
                    threshold = self.config.threshold,
                    "level above safe limit, raising alert"
                );
                self.dispatch(breach_message(reading.value, self.config.threshold));
            }
            AlarmStatus::Cleared => {
                info!(source = %reading.source, level = reading.value, "level back in safe range");
                if self.config.notify_on_clear {
                    self.dispatch(clear_message(reading.value));
                }
            }
            AlarmStatus::Suppressed => {
                debug!(source = %reading.source, level = reading.value, "still above limit, alert already active");
            }
            AlarmStatus::Safe => {
                trace!(source = %reading.source, level = reading.value, "level safe");
            }
        }

        self.last_levels.insert(reading.source, reading.value);
        self.publish_status();
    }

    /// Fire-and-forget delivery. The reading-consumption path never
    /// awaits the transport call.
    fn dispatch(&self, message: String) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            match sink.send(&message).await {
                Ok(()) => debug!(%message, "alert delivered"),
                Err(e) => error!(error = %e, "alert delivery failed"),
            }
        });
    }

    fn publish_status(&self) {
        let mut tanks: Vec<TankStatus> = self
            .last_levels
            .iter()
            .map(|(source, &level)| TankStatus {
                source: source.clone(),
                level,
                armed: self.alarms.get(source).is_some_and(ThresholdAlarm::is_armed),
            })
            .collect();
        tanks.sort_by(|a, b| a.source.cmp(&b.source));

        if self.status_tx.send(tanks).is_err() {
            trace!("status channel closed");
        }
    }
}

fn breach_message(level: f64, threshold: f64) -> String {
    format!("ALERT! Water level is {level}. Above safe limit of {threshold}.")
}

fn clear_message(level: f64) -> String {
    format!("Water level back in safe range at {level}.")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use tokio::task::yield_now;

    use super::*;
    use crate::notify::NotifyError;

    /// Records every message it is asked to deliver.
    struct RecordingSink {
        sent: Mutex<Vec<String>>,
        fail: AtomicBool,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            })
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(&self, message: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(message.to_string());
            if self.fail.load(Ordering::SeqCst) {
                Err(NotifyError::Rejected(500))
            } else {
                Ok(())
            }
        }
    }

    fn monitor_with(
        config: MonitorConfig,
        sink: Arc<RecordingSink>,
    ) -> (LevelMonitor, watch::Receiver<Vec<TankStatus>>) {
        let (_tx, rx) = mpsc::channel(8);
        let (status_tx, status_rx) = watch::channel(Vec::new());
        (LevelMonitor::new(config, rx, sink, status_tx), status_rx)
    }

    fn reading(value: f64) -> Reading {
        Reading {
            source: "sensorData".to_string(),
            value,
        }
    }

    /// Let spawned dispatch tasks run on the current-thread runtime.
    async fn settle() {
        for _ in 0..4 {
            yield_now().await;
        }
    }

    #[tokio::test]
    async fn notifies_once_per_breach_episode() {
        let sink = RecordingSink::new();
        let (mut monitor, _status_rx) = monitor_with(MonitorConfig::default(), Arc::clone(&sink));

        for value in [50.0, 90.0, 92.0, 80.0, 95.0] {
            monitor.handle_reading(reading(value));
        }
        settle().await;

        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("90"));
        assert!(sent[1].contains("95"));
    }

    #[tokio::test]
    async fn clear_is_silent_by_default() {
        let sink = RecordingSink::new();
        let (mut monitor, _status_rx) = monitor_with(MonitorConfig::default(), Arc::clone(&sink));

        monitor.handle_reading(reading(90.0));
        monitor.handle_reading(reading(50.0));
        settle().await;

        assert_eq!(sink.sent().len(), 1);
    }

    #[tokio::test]
    async fn notify_on_clear_sends_recovery_message() {
        let sink = RecordingSink::new();
        let config = MonitorConfig {
            notify_on_clear: true,
            ..MonitorConfig::default()
        };
        let (mut monitor, _status_rx) = monitor_with(config, Arc::clone(&sink));

        monitor.handle_reading(reading(90.0));
        monitor.handle_reading(reading(50.0));
        settle().await;

        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].contains("safe range"));
    }

    #[tokio::test]
    async fn delivery_failure_leaves_alarm_armed() {
        let sink = RecordingSink::new();
        sink.fail.store(true, Ordering::SeqCst);
        let (mut monitor, status_rx) = monitor_with(MonitorConfig::default(), Arc::clone(&sink));

        monitor.handle_reading(reading(90.0));
        settle().await;

        // Dispatch failed, but the alarm stays armed: the next breaching
        // reading must not re-notify.
        assert!(status_rx.borrow()[0].armed);
        monitor.handle_reading(reading(91.0));
        settle().await;
        assert_eq!(sink.sent().len(), 1);

        // And a later safe reading still clears normally.
        monitor.handle_reading(reading(40.0));
        assert!(!status_rx.borrow()[0].armed);
    }

    #[tokio::test]
    async fn non_finite_readings_are_ignored() {
        let sink = RecordingSink::new();
        let (mut monitor, status_rx) = monitor_with(MonitorConfig::default(), Arc::clone(&sink));

        monitor.handle_reading(reading(f64::NAN));
        monitor.handle_reading(reading(f64::INFINITY));
        settle().await;

        assert!(sink.sent().is_empty());
        assert!(status_rx.borrow().is_empty());
    }

    #[tokio::test]
    async fn sources_have_independent_alarms() {
        let sink = RecordingSink::new();
        let (mut monitor, status_rx) = monitor_with(MonitorConfig::default(), Arc::clone(&sink));

        monitor.handle_reading(Reading {
            source: "north".to_string(),
            value: 90.0,
        });
        monitor.handle_reading(Reading {
            source: "south".to_string(),
            value: 92.0,
        });
        settle().await;

        // One alert each, not one shared episode.
        assert_eq!(sink.sent().len(), 2);

        let tanks = status_rx.borrow().clone();
        assert_eq!(tanks.len(), 2);
        assert!(tanks.iter().all(|t| t.armed));
    }

    #[tokio::test]
    async fn status_snapshot_tracks_levels() {
        let sink = RecordingSink::new();
        let (mut monitor, status_rx) = monitor_with(MonitorConfig::default(), Arc::clone(&sink));

        monitor.handle_reading(reading(42.0));
        let tanks = status_rx.borrow().clone();
        assert_eq!(tanks.len(), 1);
        assert_eq!(tanks[0].level, 42.0);
        assert!(!tanks[0].armed);
    }

    #[test]
    fn breach_message_embeds_level_and_threshold() {
        let message = breach_message(92.5, 85.0);
        assert!(message.contains("92.5"));
        assert!(message.contains("85"));
    }
}
