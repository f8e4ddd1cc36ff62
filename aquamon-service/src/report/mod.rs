//! Water-quality report generation.
//!
//! A stateless request/response path: four sensor readings go in, a
//! natural-language report comes out of an external text-generation
//! service behind the [`ReportGenerator`] trait.

mod gemini;
mod prompt;

pub use gemini::GeminiGenerator;
pub use prompt::build_prompt;

use async_trait::async_trait;
use thiserror::Error;

/// One snapshot of the water-quality sensors. All four readings are
/// required; zero is a valid value for any of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterSample {
    /// Total dissolved solids, ppm.
    pub tds: f64,
    /// °C.
    pub temperature: f64,
    /// NTU.
    pub turbidity: f64,
    pub ph: f64,
}

/// Errors from the text-generation service.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("text service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("text service returned status {0}")]
    Rejected(u16),

    /// The service answered 2xx but produced no usable text.
    #[error("text service returned no candidates")]
    Empty,
}

/// A capability that turns a prompt into generated text.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Fixed-text generator for dev mode, when no API key is configured.
pub struct CannedGenerator;

#[async_trait]
impl ReportGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Ok("Water quality report generation is running in dev mode; \
            configure GEMINI_API_KEY for live reports."
            .to_string())
    }
}
