#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Telemetry field carrying the level (e.g. "waterLevel"). One
    /// monitor instance is parameterized by field rather than keeping a
    /// copy of the alert logic per field.
    pub field: String,

    /// Safety threshold, same unit as the level. Strictly above is a
    /// breach; at or below is safe.
    pub threshold: f64,

    /// Send a recovery notification when an alert clears. Clearing is
    /// silent by default.
    pub notify_on_clear: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            field: "waterLevel".to_string(),
            threshold: 85.0,
            notify_on_clear: false,
        }
    }
}
