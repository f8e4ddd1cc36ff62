//! API data transfer objects.
//!
//! These types define the API contract shared between the server and
//! clients. Field names on the wire keep the sensor vendor's
//! capitalization (`TDS`, `pH`, ...).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::report::WaterSample;

/// Request body for report generation. All four readings are required;
/// they are modeled as options so a missing field can be reported by
/// name instead of failing body extraction.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ReportRequest {
    #[serde(rename = "TDS")]
    pub tds: Option<f64>,
    #[serde(rename = "Temperature")]
    pub temperature: Option<f64>,
    #[serde(rename = "Turbidity")]
    pub turbidity: Option<f64>,
    #[serde(rename = "pH")]
    pub ph: Option<f64>,
}

impl ReportRequest {
    /// Names of required fields that are absent. Zero is a value, not
    /// an absence.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.tds.is_none() {
            missing.push("TDS");
        }
        if self.temperature.is_none() {
            missing.push("Temperature");
        }
        if self.turbidity.is_none() {
            missing.push("Turbidity");
        }
        if self.ph.is_none() {
            missing.push("pH");
        }
        missing
    }

    /// The validated sample, or `None` if any field is absent.
    pub fn sample(&self) -> Option<WaterSample> {
        Some(WaterSample {
            tds: self.tds?,
            temperature: self.temperature?,
            turbidity: self.turbidity?,
            ph: self.ph?,
        })
    }
}

/// Successful report generation.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct ReportResponse {
    pub report: String,
}

/// Error payload for validation and upstream failures.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Per-tank monitor status.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct TankStatus {
    pub source: String,
    /// Most recent level reading.
    pub level: f64,
    /// Whether an alert is currently active for this tank.
    pub armed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_valued_fields_are_not_missing() {
        let request: ReportRequest = serde_json::from_str(
            r#"{"TDS": 0, "Temperature": 20, "Turbidity": 1, "pH": 7}"#,
        )
        .unwrap();

        assert!(request.missing_fields().is_empty());
        let sample = request.sample().unwrap();
        assert_eq!(sample.tds, 0.0);
    }

    #[test]
    fn absent_fields_are_reported_by_name() {
        let request: ReportRequest =
            serde_json::from_str(r#"{"TDS": 100, "Temperature": 20, "Turbidity": 1}"#).unwrap();

        assert_eq!(request.missing_fields(), vec!["pH"]);
        assert!(request.sample().is_none());
    }

    #[test]
    fn wire_names_keep_vendor_capitalization() {
        let request: ReportRequest =
            serde_json::from_str(r#"{"pH": 6.8}"#).unwrap();
        assert_eq!(request.ph, Some(6.8));
        assert_eq!(
            request.missing_fields(),
            vec!["TDS", "Temperature", "Turbidity"]
        );
    }
}
