use std::ops::RangeInclusive;
use std::path::Path;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use crate::drivers::TelemetryError;
pub const TIME_WINDOW_LIMITS: RangeInclusive<i64> = 1..=600;
pub const LABEL_INTERVAL_LIMITS: RangeInclusive<i64> = 1..=1000;
pub const SAMPLING_RATE_LIMITS: RangeInclusive<f64> = 1.0..=2048.0;
/// Session defaults for the chart core. Every field falls back to its
/// default when missing from the JSON document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Buffer cap per channel, counted in points.
    pub time_window_seconds: u32,
    pub x_axis_label_interval: u32,
    pub sampling_rate_hz: f64,
    pub auto_y_axis: bool,
    pub heart_rate_min_bpm: f64,
    pub heart_rate_max_bpm: f64,
    pub poll_interval_ms: u64,
    pub initial_parameter: String,
}
impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            time_window_seconds: 20,
            x_axis_label_interval: 5,
            sampling_rate_hz: 51.2,
            auto_y_axis: false,
            heart_rate_min_bpm: 30.0,
            heart_rate_max_bpm: 220.0,
            poll_interval_ms: 5,
            initial_parameter: crate::drivers::topology::GYROSCOPE.to_string(),
        }
    }
}
impl ChartConfig {
    pub fn from_json_str(json: &str) -> Result<Self, TelemetryError> {
        let config: ChartConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read chart config {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("invalid chart config {}", path.display()))
    }
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if !TIME_WINDOW_LIMITS.contains(&i64::from(self.time_window_seconds)) {
            return Err(TelemetryError::InvalidConfig(format!(
                "time_window_seconds {} outside 1..=600",
                self.time_window_seconds
            )));
        }
        if !LABEL_INTERVAL_LIMITS.contains(&i64::from(self.x_axis_label_interval)) {
            return Err(TelemetryError::InvalidConfig(format!(
                "x_axis_label_interval {} outside 1..=1000",
                self.x_axis_label_interval
            )));
        }
        if !SAMPLING_RATE_LIMITS.contains(&self.sampling_rate_hz) {
            return Err(TelemetryError::InvalidConfig(format!(
                "sampling_rate_hz {} outside 1..=2048",
                self.sampling_rate_hz
            )));
        }
        if !(self.heart_rate_min_bpm < self.heart_rate_max_bpm) {
            return Err(TelemetryError::InvalidConfig(
                "heart_rate_min_bpm must be below heart_rate_max_bpm".into(),
            ));
        }
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn missing_fields_use_defaults() {
        let config = ChartConfig::from_json_str(r#"{"time_window_seconds": 50}"#).unwrap();
        assert_eq!(config.time_window_seconds, 50);
        assert_eq!(config.x_axis_label_interval, 5);
        assert_eq!(config.sampling_rate_hz, 51.2);
    }
    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            ChartConfig::from_json_str(r#"{"time_window_seconds": 0}"#),
            Err(TelemetryError::InvalidConfig(_))
        ));
        assert!(matches!(
            ChartConfig::from_json_str(r#"{"heart_rate_min_bpm": 300}"#),
            Err(TelemetryError::InvalidConfig(_))
        ));
        assert!(matches!(
            ChartConfig::from_json_str("not json"),
            Err(TelemetryError::Json(_))
        ));
    }
    #[test]
    fn load_reports_missing_file() {
        let err = ChartConfig::load("/nonexistent/biochart.json").unwrap_err();
        assert!(err.to_string().contains("failed to read chart config"));
    }
}
