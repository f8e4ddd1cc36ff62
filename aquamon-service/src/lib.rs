//! Water tank monitoring and alerting service.
//!
//! aquamon watches a live-updating tank level feed, raises an SMS alert
//! when the level crosses a configured safety threshold, and suppresses
//! duplicates until the level returns to the safe range. A secondary HTTP
//! endpoint turns a snapshot of water-quality sensor readings into a
//! natural-language report via a text-generation service.

pub mod api;
pub mod api_client;
pub mod config;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod report;
pub mod telemetry;
pub mod tracing;
pub mod types;
