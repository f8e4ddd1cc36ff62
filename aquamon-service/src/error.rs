//! Crate-wide error and result types.

use thiserror::Error;

use crate::notify::NotifyError;
use crate::report::GenerateError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("telemetry stream error: {0}")]
    Telemetry(String),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
