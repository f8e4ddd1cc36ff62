//! Tracing setup and the logging prelude used throughout the crate.
//!
//! Modules import `crate::tracing::prelude::*` rather than naming the
//! tracing macros individually.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub mod prelude {
    pub use tracing::{debug, error, info, trace, warn};
}

/// Initialize the global subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. When
/// `AQUAMON_JOURNALD` is set and a journald socket is reachable, log to
/// journald; otherwise log to stderr.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var_os("AQUAMON_JOURNALD").is_some() {
        match tracing_journald::layer() {
            Ok(journald) => {
                registry.with(journald).init();
                return;
            }
            Err(e) => eprintln!("journald requested but unavailable ({e}), using stderr"),
        }
    }

    registry.with(tracing_subscriber::fmt::layer()).init();
}
