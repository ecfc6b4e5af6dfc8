use log::{debug, warn};
use crate::drivers::error::{DeviceError, TelemetryError};
use crate::drivers::source::{DeviceFamily, SensorDevice};
/// Crystal the sampling timer divides down from.
pub const DEFAULT_CLOCK_HZ: f64 = 32768.0;
/// Largest divisor the 16-bit sampling timer accepts.
pub const MAX_DIVISOR: f64 = 65535.0;
/// Relative distance from a half within which a ratio counts as an exact tie.
/// Rates derived from the clock come back as ratios like 100.49999999999999.
const TIE_TOLERANCE: f64 = 1e-12;
/// Closest rate the hardware timer can produce: `clock / round(clock / requested)`
/// with ties rounded away from zero and the divisor kept in `1..=MAX_DIVISOR`.
pub fn quantize_sampling_rate(clock_hz: f64, requested_hz: f64) -> Result<f64, TelemetryError> {
    if !(requested_hz > 0.0) {
        return Err(TelemetryError::InvalidSampleRate(requested_hz));
    }
    let ratio = clock_hz / requested_hz;
    let below = ratio.floor();
    let divisor = if ((ratio - below) - 0.5).abs() <= TIE_TOLERANCE * ratio {
        below + 1.0
    } else {
        ratio.round()
    };
    Ok(clock_hz / divisor.clamp(1.0, MAX_DIVISOR))
}
/// Devices currently attached, at most one per family.
#[derive(Default)]
pub struct AttachedDevices {
    board: Option<Box<dyn SensorDevice>>,
    wristband: Option<Box<dyn SensorDevice>>,
}
impl AttachedDevices {
    /// Attaches `device` in its family slot and returns whatever it replaced.
    pub fn attach(&mut self, device: Box<dyn SensorDevice>) -> Option<Box<dyn SensorDevice>> {
        match device.family() {
            DeviceFamily::Board => self.board.replace(device),
            DeviceFamily::Wristband => self.wristband.replace(device),
        }
    }
    pub fn detach(&mut self, family: DeviceFamily) -> Option<Box<dyn SensorDevice>> {
        match family {
            DeviceFamily::Board => self.board.take(),
            DeviceFamily::Wristband => self.wristband.take(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.board.is_none() && self.wristband.is_none()
    }
    pub fn active(&self) -> Option<&dyn SensorDevice> {
        self.board.as_deref().or(self.wristband.as_deref())
    }
    /// The board when present, otherwise the wristband.
    pub fn active_mut(&mut self) -> Option<&mut Box<dyn SensorDevice>> {
        if self.board.is_some() {
            self.board.as_mut()
        } else {
            self.wristband.as_mut()
        }
    }
}
#[derive(Clone, Debug, PartialEq)]
pub enum Negotiation {
    /// No device attached; the request is used as-is.
    PassThrough(f64),
    Applied {
        family: DeviceFamily,
        requested_hz: f64,
        applied_hz: f64,
    },
    /// The device failed; nothing changed.
    NoEffect(DeviceError),
}
impl Negotiation {
    pub fn effective_rate(&self) -> Option<f64> {
        match self {
            Negotiation::PassThrough(hz) => Some(*hz),
            Negotiation::Applied { applied_hz, .. } => Some(*applied_hz),
            Negotiation::NoEffect(_) => None,
        }
    }
}
/// Sends a rate request to the active device. Transport failures are
/// absorbed into [`Negotiation::NoEffect`]; only a non-positive request is an error.
pub fn negotiate(
    devices: &mut AttachedDevices,
    requested_hz: f64,
) -> Result<Negotiation, TelemetryError> {
    let Some(device) = devices.active_mut() else {
        return Ok(Negotiation::PassThrough(requested_hz));
    };
    if !(requested_hz > 0.0) {
        return Err(TelemetryError::InvalidSampleRate(requested_hz));
    }
    let family = device.family();
    match device.set_sampling_rate(requested_hz) {
        Ok(applied_hz) => {
            debug!("{family:?} negotiated {requested_hz} Hz -> {applied_hz} Hz");
            Ok(Negotiation::Applied {
                family,
                requested_hz,
                applied_hz,
            })
        }
        Err(err) => {
            warn!("{family:?} rejected sampling rate {requested_hz} Hz: {err}");
            Ok(Negotiation::NoEffect(err))
        }
    }
}
