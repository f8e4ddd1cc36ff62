//! Environment-driven configuration.
//!
//! Credential variables keep the names the deployment already uses
//! (`TWILIO_*`, `FIREBASE_*`, `GEMINI_API_KEY`, `PORT`); aquamon-specific
//! knobs use an `AQUAMON_` prefix. A `.env` file is honored when the
//! binaries load one before calling [`Config::from_env`].
//!
//! With `AQUAMON_DEV_MODE=1` the service boots without SMS or
//! text-generation credentials, substituting log-only and canned
//! implementations. The telemetry database URL is required in every mode;
//! without it there is nothing to monitor.

use std::env;
use std::net::SocketAddr;

use crate::error::{Error, Result};
use crate::monitor::MonitorConfig;
use crate::notify::TwilioConfig;
use crate::telemetry::FirebaseConfig;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TELEMETRY_PATH: &str = "sensorData";

#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address for the HTTP API.
    pub api_addr: SocketAddr,
    pub telemetry: FirebaseConfig,
    pub monitor: MonitorConfig,
    /// SMS credentials; `None` only in dev mode.
    pub twilio: Option<TwilioConfig>,
    /// Text-generation key; `None` only in dev mode.
    pub gemini_api_key: Option<String>,
    pub dev_mode: bool,
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("missing environment variable {name}")))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn flag(name: &str) -> bool {
    matches!(optional(name).as_deref(), Some("1") | Some("true"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dev_mode = flag("AQUAMON_DEV_MODE");

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a port number: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let defaults = MonitorConfig::default();
        let threshold = match optional("AQUAMON_THRESHOLD") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("AQUAMON_THRESHOLD is not a number: {raw}")))?,
            None => defaults.threshold,
        };
        let field = optional("AQUAMON_FIELD").unwrap_or(defaults.field);

        let monitor = MonitorConfig {
            field: field.clone(),
            threshold,
            notify_on_clear: flag("AQUAMON_NOTIFY_ON_CLEAR"),
        };

        let telemetry = FirebaseConfig {
            database_url: required("FIREBASE_DATABASE_URL")?,
            path: optional("AQUAMON_TELEMETRY_PATH")
                .unwrap_or_else(|| DEFAULT_TELEMETRY_PATH.to_string()),
            field,
            auth: optional("FIREBASE_AUTH_TOKEN"),
        };

        let twilio = Self::twilio_from_env(dev_mode)?;

        let gemini_api_key = match optional("GEMINI_API_KEY") {
            Some(key) => Some(key),
            None if dev_mode => None,
            None => {
                return Err(Error::Config(
                    "missing environment variable GEMINI_API_KEY \
                     (set AQUAMON_DEV_MODE=1 to run without it)"
                        .to_string(),
                ));
            }
        };

        Ok(Self {
            api_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            telemetry,
            monitor,
            twilio,
            gemini_api_key,
            dev_mode,
        })
    }

    fn twilio_from_env(dev_mode: bool) -> Result<Option<TwilioConfig>> {
        const VARS: [&str; 4] = [
            "TWILIO_ACCOUNT_SID",
            "TWILIO_AUTH_TOKEN",
            "TWILIO_PHONE",
            "ALERT_PHONE",
        ];

        let missing: Vec<&str> = VARS
            .iter()
            .copied()
            .filter(|name| env::var(name).is_err())
            .collect();

        if missing.is_empty() {
            return Ok(Some(TwilioConfig {
                account_sid: required("TWILIO_ACCOUNT_SID")?,
                auth_token: required("TWILIO_AUTH_TOKEN")?,
                from: required("TWILIO_PHONE")?,
                to: required("ALERT_PHONE")?,
            }));
        }

        if dev_mode {
            return Ok(None);
        }

        Err(Error::Config(format!(
            "missing environment variables: {} \
             (set AQUAMON_DEV_MODE=1 to run without SMS)",
            missing.join(", ")
        )))
    }
}
