use thiserror::Error;
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("sampling rate must be greater than zero, got {0}")]
    InvalidSampleRate(f64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Device(#[from] DeviceError),
}
/// Failures reported by the device/transport side.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeviceError {
    #[error("no device attached")]
    NotAttached,
    #[error("device {0} is not connected")]
    NotConnected(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("device rejected sampling rate {requested_hz} Hz")]
    RateRejected { requested_hz: f64 },
}
