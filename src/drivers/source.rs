use std::f64::consts::PI;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use crate::drivers::error::DeviceError;
use crate::drivers::rate::{quantize_sampling_rate, DEFAULT_CLOCK_HZ};
use crate::drivers::topology::{self, GYROSCOPE, LOW_NOISE_ACCELEROMETER, MAGNETOMETER, WIDE_RANGE_ACCELEROMETER};
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceFamily {
    /// Full sensor board; preferred when both families are attached.
    Board,
    Wristband,
}
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Axis3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
impl Axis3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
    fn axis(&self, axis: char) -> Option<f64> {
        match axis {
            'X' => Some(self.x),
            'Y' => Some(self.y),
            'Z' => Some(self.z),
            _ => None,
        }
    }
}
/// One decoded packet from the sensor board.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardSample {
    pub low_noise_accel: Option<Axis3>,
    pub wide_range_accel: Option<Axis3>,
    pub gyroscope: Option<Axis3>,
    pub magnetometer: Option<Axis3>,
    pub battery_voltage: Option<f64>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub ext_adc_a6: Option<f64>,
    pub ext_adc_a7: Option<f64>,
    pub ext_adc_a15: Option<f64>,
    pub exg1: Option<f64>,
    pub exg2: Option<f64>,
    pub heart_rate: Option<f64>,
}
/// One decoded packet from the wristband. Its accelerometer is reported on
/// the low-noise accelerometer channels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WristbandSample {
    pub accelerometer: Option<Axis3>,
    pub gyroscope: Option<Axis3>,
    pub heart_rate: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub temperature: Option<f64>,
}
#[derive(Clone, Debug, PartialEq)]
pub enum Sample {
    Board(BoardSample),
    Wristband(WristbandSample),
}
impl Sample {
    pub fn family(&self) -> DeviceFamily {
        match self {
            Sample::Board(_) => DeviceFamily::Board,
            Sample::Wristband(_) => DeviceFamily::Wristband,
        }
    }
    /// Scalar value for a storage key. Missing and non-finite fields yield `None`.
    pub fn channel_value(&self, key: &str) -> Option<f64> {
        let value = match topology::imu_leaf(key) {
            Some((group, axis)) => self.triad(group)?.axis(axis),
            None => self.scalar(key),
        }?;
        value.is_finite().then_some(value)
    }
    fn triad(&self, group: &str) -> Option<Axis3> {
        match self {
            Sample::Board(s) => match group {
                LOW_NOISE_ACCELEROMETER => s.low_noise_accel,
                WIDE_RANGE_ACCELEROMETER => s.wide_range_accel,
                GYROSCOPE => s.gyroscope,
                MAGNETOMETER => s.magnetometer,
                _ => None,
            },
            Sample::Wristband(s) => match group {
                LOW_NOISE_ACCELEROMETER => s.accelerometer,
                GYROSCOPE => s.gyroscope,
                _ => None,
            },
        }
    }
    fn scalar(&self, key: &str) -> Option<f64> {
        match self {
            Sample::Board(s) => match key {
                topology::BATTERY_VOLTAGE => s.battery_voltage,
                topology::TEMPERATURE => s.temperature,
                topology::PRESSURE => s.pressure,
                topology::EXT_ADC_A6 => s.ext_adc_a6,
                topology::EXT_ADC_A7 => s.ext_adc_a7,
                topology::EXT_ADC_A15 => s.ext_adc_a15,
                topology::EXG1 => s.exg1,
                topology::EXG2 => s.exg2,
                topology::HEART_RATE => s.heart_rate,
                _ => None,
            },
            Sample::Wristband(s) => match key {
                topology::BATTERY_VOLTAGE => s.battery_voltage,
                topology::TEMPERATURE => s.temperature,
                topology::HEART_RATE => s.heart_rate,
                _ => None,
            },
        }
    }
}
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExgMode {
    Ecg,
    Emg,
    TestSignal,
    Respiration,
    #[default]
    Generic,
}
impl ExgMode {
    pub fn group_name(self) -> &'static str {
        match self {
            ExgMode::Ecg => topology::ECG,
            ExgMode::Emg => topology::EMG,
            ExgMode::TestSignal => topology::EXG_TEST,
            ExgMode::Respiration => topology::RESPIRATION,
            ExgMode::Generic => topology::EXG,
        }
    }
}
/// Which sensors the attached device has enabled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSelection {
    pub low_noise_accel: bool,
    pub wide_range_accel: bool,
    pub gyroscope: bool,
    pub magnetometer: bool,
    pub battery: bool,
    pub temperature: bool,
    pub pressure: bool,
    pub ext_adc_a6: bool,
    pub ext_adc_a7: bool,
    pub ext_adc_a15: bool,
    pub exg: Option<ExgMode>,
    pub heart_rate: bool,
}
impl SensorSelection {
    pub fn gyroscope_only() -> Self {
        Self {
            gyroscope: true,
            ..Self::default()
        }
    }
    fn enabled_triads(&self) -> Vec<&'static str> {
        [
            (self.low_noise_accel, LOW_NOISE_ACCELEROMETER),
            (self.wide_range_accel, WIDE_RANGE_ACCELEROMETER),
            (self.gyroscope, GYROSCOPE),
            (self.magnetometer, MAGNETOMETER),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
    fn enabled_singles(&self) -> Vec<&'static str> {
        [
            (self.battery, topology::BATTERY_VOLTAGE),
            (self.temperature, topology::TEMPERATURE),
            (self.pressure, topology::PRESSURE),
            (self.ext_adc_a6, topology::EXT_ADC_A6),
            (self.ext_adc_a7, topology::EXT_ADC_A7),
            (self.ext_adc_a15, topology::EXT_ADC_A15),
            (self.heart_rate, topology::HEART_RATE),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
    /// Ordered storage keys of every channel these sensors produce.
    pub fn channel_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .enabled_triads()
            .into_iter()
            .flat_map(topology::sub_channels)
            .collect();
        if let Some(mode) = self.exg {
            keys.extend(topology::sub_channels(mode.group_name()));
        }
        keys.extend(self.enabled_singles().into_iter().map(String::from));
        keys
    }
    /// Labels offered in the parameter picker: each group, its split variant,
    /// then every leaf.
    pub fn parameter_labels(&self) -> Vec<String> {
        let mut groups: Vec<&str> = self.enabled_triads();
        if let Some(mode) = self.exg {
            groups.push(mode.group_name());
        }
        let mut labels = Vec::new();
        for group in &groups {
            labels.push(group.to_string());
            labels.push(format!(
                "{} {group} {}",
                topology::SPLIT_MARKER,
                topology::SEPARATE_CHARTS_HINT
            ));
        }
        for group in &groups {
            labels.extend(topology::sub_channels(group));
        }
        labels.extend(self.enabled_singles().into_iter().map(String::from));
        labels
    }
}
/// Device/transport collaborator. Implementations own the link to the
/// hardware; the controller only drives this life cycle.
pub trait SensorDevice: Send {
    fn family(&self) -> DeviceFamily;
    fn name(&self) -> &str;
    fn connect(&mut self) -> Result<(), DeviceError>;
    fn start_streaming(&mut self) -> Result<(), DeviceError>;
    fn stop_streaming(&mut self) -> Result<(), DeviceError>;
    fn disconnect(&mut self) -> Result<(), DeviceError>;
    fn enabled_sensors(&self) -> SensorSelection;
    fn sampling_rate_hz(&self) -> f64;
    /// Asks the firmware for the closest achievable rate to `requested_hz`
    /// and switches to it. Returns the rate actually applied.
    fn set_sampling_rate(&mut self, requested_hz: f64) -> Result<f64, DeviceError>;
    /// Next decoded packet, if one is ready.
    fn next_sample(&mut self) -> Result<Option<Sample>, DeviceError>;
}
/// In-process device that synthesizes sinusoids plus noise. Useful for tests
/// and for running the engine without hardware.
pub struct SimulatedDevice {
    name: String,
    family: DeviceFamily,
    sensors: SensorSelection,
    clock_hz: f64,
    sampling_rate_hz: f64,
    connected: bool,
    streaming: bool,
    phase: u64,
    rng: StdRng,
}
impl SimulatedDevice {
    pub fn new(family: DeviceFamily, sensors: SensorSelection, sampling_rate_hz: f64) -> Self {
        Self {
            name: format!("simulated-{family:?}").to_lowercase(),
            family,
            sensors,
            clock_hz: DEFAULT_CLOCK_HZ,
            sampling_rate_hz,
            connected: false,
            streaming: false,
            phase: 0,
            rng: StdRng::seed_from_u64(0x5eed),
        }
    }
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }
    fn wave(&mut self, amplitude: f64, freq_hz: f64, offset: f64) -> f64 {
        let t = self.phase as f64 / self.sampling_rate_hz;
        let noise: f64 = self.rng.gen_range(-0.05..0.05);
        offset + amplitude * ((2.0 * PI * freq_hz * t).sin() + noise)
    }
    fn triad(&mut self, enabled: bool, amplitude: f64) -> Option<Axis3> {
        enabled.then(|| {
            Axis3::new(
                self.wave(amplitude, 0.5, 0.0),
                self.wave(amplitude, 0.7, 0.0),
                self.wave(amplitude, 1.1, 0.0),
            )
        })
    }
    fn scalar(&mut self, enabled: bool, amplitude: f64, offset: f64) -> Option<f64> {
        enabled.then(|| self.wave(amplitude, 0.2, offset))
    }
    fn synthesize(&mut self) -> Sample {
        let s = self.sensors.clone();
        match self.family {
            DeviceFamily::Board => Sample::Board(BoardSample {
                low_noise_accel: self.triad(s.low_noise_accel, 9.8),
                wide_range_accel: self.triad(s.wide_range_accel, 40.0),
                gyroscope: self.triad(s.gyroscope, 120.0),
                magnetometer: self.triad(s.magnetometer, 1.5),
                battery_voltage: self.scalar(s.battery, 5.0, 3900.0),
                temperature: self.scalar(s.temperature, 0.5, 24.0),
                pressure: self.scalar(s.pressure, 0.2, 101.3),
                ext_adc_a6: self.scalar(s.ext_adc_a6, 500.0, 1500.0),
                ext_adc_a7: self.scalar(s.ext_adc_a7, 500.0, 1500.0),
                ext_adc_a15: self.scalar(s.ext_adc_a15, 500.0, 1500.0),
                exg1: self.scalar(s.exg.is_some(), 1.2, 0.0),
                exg2: self.scalar(s.exg.is_some(), 0.8, 0.0),
                heart_rate: self.scalar(s.heart_rate, 6.0, 72.0),
            }),
            DeviceFamily::Wristband => Sample::Wristband(WristbandSample {
                accelerometer: self.triad(s.low_noise_accel, 9.8),
                gyroscope: self.triad(s.gyroscope, 120.0),
                heart_rate: self.scalar(s.heart_rate, 6.0, 72.0),
                battery_voltage: self.scalar(s.battery, 5.0, 3900.0),
                temperature: self.scalar(s.temperature, 0.5, 31.0),
            }),
        }
    }
}
impl SensorDevice for SimulatedDevice {
    fn family(&self) -> DeviceFamily {
        self.family
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn connect(&mut self) -> Result<(), DeviceError> {
        self.connected = true;
        info!("{} connected", self.name);
        Ok(())
    }
    fn start_streaming(&mut self) -> Result<(), DeviceError> {
        if !self.connected {
            return Err(DeviceError::NotConnected(self.name.clone()));
        }
        self.streaming = true;
        Ok(())
    }
    fn stop_streaming(&mut self) -> Result<(), DeviceError> {
        self.streaming = false;
        Ok(())
    }
    fn disconnect(&mut self) -> Result<(), DeviceError> {
        self.streaming = false;
        self.connected = false;
        info!("{} disconnected", self.name);
        Ok(())
    }
    fn enabled_sensors(&self) -> SensorSelection {
        self.sensors.clone()
    }
    fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }
    fn set_sampling_rate(&mut self, requested_hz: f64) -> Result<f64, DeviceError> {
        let applied = quantize_sampling_rate(self.clock_hz, requested_hz)
            .map_err(|_| DeviceError::RateRejected { requested_hz })?;
        debug!("{}: requested {requested_hz} Hz, applied {applied} Hz", self.name);
        self.sampling_rate_hz = applied;
        Ok(applied)
    }
    fn next_sample(&mut self) -> Result<Option<Sample>, DeviceError> {
        if !self.streaming {
            return Ok(None);
        }
        let sample = self.synthesize();
        self.phase += 1;
        Ok(Some(sample))
    }
}
