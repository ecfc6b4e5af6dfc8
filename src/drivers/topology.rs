//! Maps user-visible parameter labels onto concrete channel keys.
//!
//! Everything here is pure string handling: no buffers, no state. Labels
//! coming from the picker may carry the split marker and a trailing
//! "(separate charts)" hint; [`clean_name`] removes both before any lookup.
use std::collections::HashMap;
use once_cell::sync::Lazy;
use crate::drivers::autorange::AxisRange;
/// Leading marker the picker puts in front of split-chart variants.
pub const SPLIT_MARKER: char = '⧉';
pub const SEPARATE_CHARTS_HINT: &str = "(separate charts)";
const SEPARATE_CHARTS_DASH_HINT: &str = "- separate charts";
pub const LOW_NOISE_ACCELEROMETER: &str = "LowNoiseAccelerometer";
pub const WIDE_RANGE_ACCELEROMETER: &str = "WideRangeAccelerometer";
pub const GYROSCOPE: &str = "Gyroscope";
pub const MAGNETOMETER: &str = "Magnetometer";
pub const ECG: &str = "ECG";
pub const EMG: &str = "EMG";
pub const EXG_TEST: &str = "EXGTest";
pub const RESPIRATION: &str = "Respiration";
pub const EXG: &str = "EXG";
pub const BATTERY_VOLTAGE: &str = "BatteryVoltage";
pub const TEMPERATURE: &str = "Temperature";
pub const PRESSURE: &str = "Pressure";
pub const EXT_ADC_A6: &str = "ExtADC_A6";
pub const EXT_ADC_A7: &str = "ExtADC_A7";
pub const EXT_ADC_A15: &str = "ExtADC_A15";
pub const EXG1: &str = "Exg1";
pub const EXG2: &str = "Exg2";
/// Heart-rate-equivalent leaf; its horizontal axis always shows every sample.
pub const HEART_RATE: &str = "HeartRate";
pub const IMU_GROUPS: [&str; 4] = [
    LOW_NOISE_ACCELEROMETER,
    WIDE_RANGE_ACCELEROMETER,
    GYROSCOPE,
    MAGNETOMETER,
];
pub const EXG_GROUPS: [&str; 5] = [ECG, EMG, EXG_TEST, RESPIRATION, EXG];
const AXES: [char; 3] = ['X', 'Y', 'Z'];
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKind {
    Imu,
    Exg,
}
/// Returns the canonical group name and its kind, if `name` is a group.
pub fn group_kind(name: &str) -> Option<(&'static str, GroupKind)> {
    let name = clean_name(name);
    IMU_GROUPS
        .iter()
        .find(|g| g.eq_ignore_ascii_case(&name))
        .map(|g| (*g, GroupKind::Imu))
        .or_else(|| {
            EXG_GROUPS
                .iter()
                .find(|g| g.eq_ignore_ascii_case(&name))
                .map(|g| (*g, GroupKind::Exg))
        })
}
pub fn clean_name(label: &str) -> String {
    let mut name = label.trim_start_matches(|c: char| c == SPLIT_MARKER || c.is_whitespace());
    loop {
        let before = name;
        name = name.trim_end();
        if let Some(stripped) = strip_trailing_parenthetical(name) {
            name = stripped;
        }
        if let Some(stripped) = strip_suffix_ignore_case(name, SEPARATE_CHARTS_DASH_HINT) {
            name = stripped;
        }
        if name == before {
            break;
        }
    }
    name.trim().to_string()
}
fn strip_trailing_parenthetical(name: &str) -> Option<&str> {
    if !name.ends_with(')') {
        return None;
    }
    name.rfind('(').map(|open| &name[..open])
}
fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(cut) {
        return None;
    }
    let (head, tail) = name.split_at(cut);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
pub fn is_split_variant(label: &str) -> bool {
    if label.trim_start().starts_with(SPLIT_MARKER) {
        return true;
    }
    let lower = label.to_lowercase();
    lower.contains("separate charts")
        || lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "split")
}
pub fn is_group(name: &str) -> bool {
    group_kind(name).is_some()
}
pub fn sub_channels(group_name: &str) -> Vec<String> {
    match group_kind(group_name) {
        Some((canonical, GroupKind::Imu)) => {
            AXES.iter().map(|axis| format!("{canonical}{axis}")).collect()
        }
        Some((_, GroupKind::Exg)) => vec![EXG1.to_string(), EXG2.to_string()],
        None => Vec::new(),
    }
}
pub fn map_to_storage_key(label: &str) -> String {
    let name = clean_name(label);
    if name.eq_ignore_ascii_case("EXG1") {
        EXG1.to_string()
    } else if name.eq_ignore_ascii_case("EXG2") {
        EXG2.to_string()
    } else {
        name
    }
}
pub fn legend_label(group_name: &str, sub_channel_key: &str) -> String {
    match group_kind(group_name) {
        Some((_, GroupKind::Imu)) => sub_channel_key
            .chars()
            .last()
            .map(String::from)
            .unwrap_or_default(),
        Some((_, GroupKind::Exg)) => sub_channel_key.to_ascii_uppercase(),
        None => sub_channel_key.to_string(),
    }
}
/// Concrete storage keys a (possibly adorned) parameter label resolves to.
pub fn resolve_channels(label: &str) -> Vec<String> {
    let name = clean_name(label);
    if is_group(&name) {
        sub_channels(&name)
    } else if name.is_empty() {
        Vec::new()
    } else {
        vec![map_to_storage_key(&name)]
    }
}
/// If `key` is an IMU per-axis leaf, returns its group and axis letter.
pub fn imu_leaf(key: &str) -> Option<(&'static str, char)> {
    let axis = key.chars().last()?;
    if !AXES.contains(&axis) {
        return None;
    }
    let prefix = &key[..key.len() - axis.len_utf8()];
    IMU_GROUPS
        .iter()
        .find(|g| **g == prefix)
        .map(|g| (*g, axis))
}
pub fn is_heart_rate(label: &str) -> bool {
    map_to_storage_key(label).eq_ignore_ascii_case(HEART_RATE)
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accent {
    First,
    Second,
    Third,
}
impl Accent {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Accent::First => [0x1E, 0x88, 0xE5],
            Accent::Second => [0x43, 0xA0, 0x47],
            Accent::Third => [0xE5, 0x39, 0x35],
        }
    }
}
/// Channel 2 only gets its own accent when there are exactly three channels.
pub fn legend_accent(index: usize, channel_count: usize) -> Accent {
    match index {
        0 => Accent::First,
        1 if channel_count == 3 => Accent::Second,
        _ => Accent::Third,
    }
}
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub key: String,
    pub label: String,
    pub accent: Accent,
}
pub fn legend_entries(label: &str) -> Vec<LegendEntry> {
    let name = clean_name(label);
    let keys = resolve_channels(&name);
    let count = keys.len();
    keys.into_iter()
        .enumerate()
        .map(|(index, key)| LegendEntry {
            label: legend_label(&name, &key),
            accent: legend_accent(index, count),
            key,
        })
        .collect()
}
/// Static presentation defaults for a parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterProfile {
    pub title: String,
    pub axis_label: &'static str,
    pub unit: &'static str,
    pub default_range: AxisRange,
}
struct ProfileEntry {
    title: &'static str,
    axis_label: &'static str,
    unit: &'static str,
    range: (f64, f64),
}
const fn entry(
    title: &'static str,
    axis_label: &'static str,
    unit: &'static str,
    range: (f64, f64),
) -> ProfileEntry {
    ProfileEntry {
        title,
        axis_label,
        unit,
        range,
    }
}
static PROFILES: Lazy<HashMap<&'static str, ProfileEntry>> = Lazy::new(|| {
    let exg = entry("EXG", "Voltage", "mV", (-15.0, 15.0));
    HashMap::from([
        (
            LOW_NOISE_ACCELEROMETER,
            entry("Low-Noise Accelerometer", "Acceleration", "m/s²", (-20.0, 20.0)),
        ),
        (
            WIDE_RANGE_ACCELEROMETER,
            entry("Wide-Range Accelerometer", "Acceleration", "m/s²", (-160.0, 160.0)),
        ),
        (GYROSCOPE, entry("Gyroscope", "Angular Velocity", "deg/s", (-250.0, 250.0))),
        (MAGNETOMETER, entry("Magnetometer", "Magnetic Field", "ga", (-5.0, 5.0))),
        (ECG, entry("ECG", "Voltage", "mV", (-15.0, 15.0))),
        (EMG, entry("EMG", "Voltage", "mV", (-15.0, 15.0))),
        (EXG_TEST, entry("EXG Test Signal", "Voltage", "mV", (-15.0, 15.0))),
        (RESPIRATION, entry("Respiration", "Voltage", "mV", (-15.0, 15.0))),
        (EXG1, entry("EXG1", "Voltage", "mV", (-15.0, 15.0))),
        (EXG2, entry("EXG2", "Voltage", "mV", (-15.0, 15.0))),
        (EXG, exg),
        (BATTERY_VOLTAGE, entry("Battery Voltage", "Voltage", "mV", (3000.0, 4500.0))),
        (TEMPERATURE, entry("Temperature", "Temperature", "°C", (-10.0, 60.0))),
        (PRESSURE, entry("Pressure", "Pressure", "kPa", (80.0, 120.0))),
        (EXT_ADC_A6, entry("External ADC A6", "Voltage", "mV", (0.0, 3300.0))),
        (EXT_ADC_A7, entry("External ADC A7", "Voltage", "mV", (0.0, 3300.0))),
        (EXT_ADC_A15, entry("External ADC A15", "Voltage", "mV", (0.0, 3300.0))),
        (HEART_RATE, entry("Heart Rate", "Heart Rate", "bpm", (30.0, 220.0))),
    ])
});
const FALLBACK_RANGE: (f64, f64) = (-100.0, 100.0);
pub fn profile_for(label: &str) -> ParameterProfile {
    let name = clean_name(label);
    let key = group_kind(&name)
        .map(|(canonical, _)| canonical.to_string())
        .unwrap_or_else(|| map_to_storage_key(&name));
    let build = |e: &ProfileEntry, title: String| ParameterProfile {
        title,
        axis_label: e.axis_label,
        unit: e.unit,
        default_range: AxisRange::new(e.range.0, e.range.1),
    };
    if let Some(e) = PROFILES.get(key.as_str()) {
        return build(e, e.title.to_string());
    }
    if let Some((group, axis)) = imu_leaf(&key) {
        if let Some(e) = PROFILES.get(group) {
            return build(e, format!("{} {axis}", e.title));
        }
    }
    ParameterProfile {
        title: name,
        axis_label: "Value",
        unit: "",
        default_range: AxisRange::new(FALLBACK_RANGE.0, FALLBACK_RANGE.1),
    }
}
