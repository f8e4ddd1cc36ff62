//! Telemetry ingestion.
//!
//! A subscription task pushes [`Reading`]s into an mpsc channel consumed
//! by the monitor. Readings are trusted in arrival order; there is no
//! reordering or deduplication at this layer. Updates whose monitored
//! field is absent or `null` are dropped without error, and non-numeric
//! values are logged and dropped, so a misbehaving sensor can never take
//! the process down.

pub mod firebase;

pub use firebase::{FirebaseConfig, FirebaseSubscription};

use serde_json::Value;

/// A single level sample, tagged with the source it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Source identifier (the subscribed path, e.g. "sensorData").
    pub source: String,
    /// Level as a percentage. Passed through unclamped.
    pub value: f64,
}

/// Outcome of looking up the monitored field in a stream update.
#[derive(Debug, PartialEq)]
pub(crate) enum FieldLookup {
    /// Field present and numeric.
    Value(f64),
    /// Update did not contain the field.
    Absent,
    /// Field present but explicitly `null`.
    Null,
    /// Field present but not a number.
    NotNumeric(String),
}

/// Look up `field` in an update delivered for `path`.
///
/// Updates arrive either for the subscription root (`path == "/"`, data
/// is the whole object) or for a single child (`path == "/<field>"`,
/// data is the bare value). Updates for unrelated children are ignored.
pub(crate) fn lookup_field(path: &str, data: &Value, field: &str) -> FieldLookup {
    let value = if path == "/" {
        match data.get(field) {
            Some(v) => v,
            None => return FieldLookup::Absent,
        }
    } else if path.trim_start_matches('/') == field {
        data
    } else {
        return FieldLookup::Absent;
    };

    match value {
        Value::Null => FieldLookup::Null,
        Value::Number(n) => match n.as_f64() {
            Some(v) => FieldLookup::Value(v),
            None => FieldLookup::NotNumeric(value.to_string()),
        },
        other => FieldLookup::NotNumeric(other.to_string()),
    }
}
