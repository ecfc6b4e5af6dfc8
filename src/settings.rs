//! User-editable numeric settings with rollback on invalid input.
//!
//! Each setting keeps the text the user typed, the numeric value in effect
//! and the last value that passed validation. An edit either commits, is left
//! pending (a lone sign while typing), resets to a default (blank text), or is
//! rejected, in which case the text snaps back to the last good value.
use std::fmt;
use thiserror::Error;
use crate::config::{ChartConfig, LABEL_INTERVAL_LIMITS, SAMPLING_RATE_LIMITS, TIME_WINDOW_LIMITS};
use crate::drivers::AxisRange;
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingKind {
    YAxisMin,
    YAxisMax,
    TimeWindow,
    XAxisLabelInterval,
    SamplingRate,
}
impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SettingKind::YAxisMin => "Y-axis minimum",
            SettingKind::YAxisMax => "Y-axis maximum",
            SettingKind::TimeWindow => "Time window",
            SettingKind::XAxisLabelInterval => "X-axis label interval",
            SettingKind::SamplingRate => "Sampling rate",
        })
    }
}
/// Short, user-facing reasons an edit was refused.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} must be a number")]
    NotANumber(SettingKind),
    #[error("{0} must be a whole number")]
    NotAnInteger(SettingKind),
    #[error("Y-axis minimum must be less than the maximum")]
    MinNotBelowMax,
    #[error("{setting} must be between {min} and {max}")]
    OutOfRange {
        setting: SettingKind,
        min: f64,
        max: f64,
    },
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditState {
    Editing,
    Committed,
    Rejected,
}
#[derive(Clone, Debug, PartialEq)]
pub struct EditableSetting<T> {
    text: String,
    value: T,
    last_valid: T,
    state: EditState,
}
impl<T: Copy + fmt::Display> EditableSetting<T> {
    pub fn new(value: T) -> Self {
        Self {
            text: value.to_string(),
            value,
            last_valid: value,
            state: EditState::Committed,
        }
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn value(&self) -> T {
        self.value
    }
    pub fn last_valid(&self) -> T {
        self.last_valid
    }
    pub fn state(&self) -> EditState {
        self.state
    }
    fn begin_edit(&mut self, text: &str) {
        self.text = text.to_string();
        self.state = EditState::Editing;
    }
    pub fn commit(&mut self, value: T) {
        self.value = value;
        self.last_valid = value;
        self.text = value.to_string();
        self.state = EditState::Committed;
    }
    /// Accepts `value` but leaves the typed text alone (blank resets).
    fn commit_silently(&mut self, value: T) {
        self.value = value;
        self.last_valid = value;
        self.state = EditState::Committed;
    }
    pub fn reject(&mut self) {
        self.text = self.last_valid.to_string();
        self.state = EditState::Rejected;
    }
    /// Displays `value` without making it the last-known-good value.
    fn show(&mut self, value: T) {
        self.value = value;
        self.text = value.to_string();
    }
    fn backup(&mut self) {
        self.last_valid = self.value;
    }
    fn restore(&mut self) {
        self.value = self.last_valid;
        self.text = self.last_valid.to_string();
        self.state = EditState::Committed;
    }
}
#[derive(Clone, Debug, PartialEq)]
pub enum CommitOutcome {
    /// Edit was not applicable (auto-ranging, disabled control).
    Ignored,
    /// Partial input such as a lone sign; nothing changed.
    Pending,
    /// Blank input; the default value is now in effect.
    Reset,
    Committed,
    Rejected(ValidationError),
    /// Valid input the device could not apply; an alert was raised instead.
    NoEffect,
}
impl CommitOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, CommitOutcome::Reset | CommitOutcome::Committed)
    }
}
/// Result of staging raw text against a setting, before any side effects.
#[derive(Clone, Debug, PartialEq)]
pub enum Staged<T> {
    Blank,
    Pending,
    Parsed(T),
    Invalid(ValidationError),
}
pub fn stage_edit<T: Copy + fmt::Display>(
    setting: &mut EditableSetting<T>,
    text: &str,
    parse: impl FnOnce(&str) -> Result<T, ValidationError>,
) -> Staged<T> {
    setting.begin_edit(text);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Staged::Blank;
    }
    if trimmed == "+" || trimmed == "-" {
        return Staged::Pending;
    }
    match parse(trimmed) {
        Ok(value) => Staged::Parsed(value),
        Err(err) => {
            setting.reject();
            Staged::Invalid(err)
        }
    }
}
fn apply_edit<T: Copy + fmt::Display>(
    setting: &mut EditableSetting<T>,
    text: &str,
    default: T,
    parse: impl FnOnce(&str) -> Result<T, ValidationError>,
) -> CommitOutcome {
    match stage_edit(setting, text, parse) {
        Staged::Blank => {
            setting.commit_silently(default);
            CommitOutcome::Reset
        }
        Staged::Pending => CommitOutcome::Pending,
        Staged::Parsed(value) => {
            setting.commit(value);
            CommitOutcome::Committed
        }
        Staged::Invalid(err) => CommitOutcome::Rejected(err),
    }
}
pub fn parse_axis_bound(kind: SettingKind, text: &str) -> Result<f64, ValidationError> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::NotANumber(kind))
}
fn parse_bounded_integer(
    kind: SettingKind,
    text: &str,
    limits: &std::ops::RangeInclusive<i64>,
) -> Result<u32, ValidationError> {
    let value: i64 = text.parse().map_err(|_| ValidationError::NotAnInteger(kind))?;
    if !limits.contains(&value) {
        return Err(ValidationError::OutOfRange {
            setting: kind,
            min: *limits.start() as f64,
            max: *limits.end() as f64,
        });
    }
    u32::try_from(value).map_err(|_| ValidationError::NotAnInteger(kind))
}
pub fn parse_sampling_rate(text: &str) -> Result<f64, ValidationError> {
    let value = parse_axis_bound(SettingKind::SamplingRate, text)?;
    if !SAMPLING_RATE_LIMITS.contains(&value) {
        return Err(ValidationError::OutOfRange {
            setting: SettingKind::SamplingRate,
            min: *SAMPLING_RATE_LIMITS.start(),
            max: *SAMPLING_RATE_LIMITS.end(),
        });
    }
    Ok(value)
}
/// Axis bounds, auto-range flag, time window and label cadence.
#[derive(Clone, Debug)]
pub struct AxisConfiguration {
    y_min: EditableSetting<f64>,
    y_max: EditableSetting<f64>,
    auto_y_axis: bool,
    time_window: EditableSetting<u32>,
    label_interval: EditableSetting<u32>,
    label_interval_enabled: bool,
    defaults: AxisRange,
    default_time_window: u32,
    default_label_interval: u32,
}
impl AxisConfiguration {
    pub fn new(config: &ChartConfig, defaults: AxisRange) -> Self {
        Self {
            y_min: EditableSetting::new(defaults.min),
            y_max: EditableSetting::new(defaults.max),
            auto_y_axis: false,
            time_window: EditableSetting::new(config.time_window_seconds),
            label_interval: EditableSetting::new(config.x_axis_label_interval),
            label_interval_enabled: true,
            defaults,
            default_time_window: config.time_window_seconds,
            default_label_interval: config.x_axis_label_interval,
        }
    }
    pub fn y_min(&self) -> &EditableSetting<f64> {
        &self.y_min
    }
    pub fn y_max(&self) -> &EditableSetting<f64> {
        &self.y_max
    }
    pub fn y_range(&self) -> AxisRange {
        AxisRange::new(self.y_min.value(), self.y_max.value())
    }
    /// Bounds that will come back when auto-ranging is switched off.
    pub fn manual_range(&self) -> AxisRange {
        AxisRange::new(self.y_min.last_valid(), self.y_max.last_valid())
    }
    pub fn default_range(&self) -> AxisRange {
        self.defaults
    }
    pub fn auto_y_axis(&self) -> bool {
        self.auto_y_axis
    }
    pub fn manual_editing_enabled(&self) -> bool {
        !self.auto_y_axis
    }
    pub fn time_window(&self) -> &EditableSetting<u32> {
        &self.time_window
    }
    /// Buffer cap per channel, in points.
    pub fn time_window_points(&self) -> usize {
        self.time_window.value() as usize
    }
    pub fn label_interval(&self) -> &EditableSetting<u32> {
        &self.label_interval
    }
    pub fn label_interval_enabled(&self) -> bool {
        self.label_interval_enabled
    }
    pub fn edit_y_min(&mut self, text: &str) -> CommitOutcome {
        if self.auto_y_axis {
            return CommitOutcome::Ignored;
        }
        let max = self.y_max.value();
        let outcome = apply_edit(&mut self.y_min, text, self.defaults.min, |t| {
            let min = parse_axis_bound(SettingKind::YAxisMin, t)?;
            if min < max {
                Ok(min)
            } else {
                Err(ValidationError::MinNotBelowMax)
            }
        });
        if outcome == CommitOutcome::Reset && self.y_min.value() >= self.y_max.value() {
            self.y_max.commit(self.defaults.max);
        }
        outcome
    }
    pub fn edit_y_max(&mut self, text: &str) -> CommitOutcome {
        if self.auto_y_axis {
            return CommitOutcome::Ignored;
        }
        let min = self.y_min.value();
        let outcome = apply_edit(&mut self.y_max, text, self.defaults.max, |t| {
            let max = parse_axis_bound(SettingKind::YAxisMax, t)?;
            if min < max {
                Ok(max)
            } else {
                Err(ValidationError::MinNotBelowMax)
            }
        });
        if outcome == CommitOutcome::Reset && self.y_min.value() >= self.y_max.value() {
            self.y_min.commit(self.defaults.min);
        }
        outcome
    }
    pub fn edit_time_window(&mut self, text: &str) -> CommitOutcome {
        apply_edit(&mut self.time_window, text, self.default_time_window, |t| {
            parse_bounded_integer(SettingKind::TimeWindow, t, &TIME_WINDOW_LIMITS)
        })
    }
    pub fn edit_label_interval(&mut self, text: &str) -> CommitOutcome {
        if !self.label_interval_enabled {
            return CommitOutcome::Ignored;
        }
        apply_edit(&mut self.label_interval, text, self.default_label_interval, |t| {
            parse_bounded_integer(SettingKind::XAxisLabelInterval, t, &LABEL_INTERVAL_LIMITS)
        })
    }
    /// Switches auto-ranging. Turning it on backs up the manual bounds and
    /// shows `auto_range`; turning it off restores the backup.
    pub fn set_auto_y_axis(&mut self, enabled: bool, auto_range: AxisRange) -> bool {
        if enabled == self.auto_y_axis {
            return false;
        }
        if enabled {
            self.y_min.backup();
            self.y_max.backup();
            self.auto_y_axis = true;
            self.apply_auto_range(auto_range);
        } else {
            self.auto_y_axis = false;
            self.y_min.restore();
            self.y_max.restore();
        }
        true
    }
    /// Shows a computed range; no effect unless auto-ranging is on.
    pub fn apply_auto_range(&mut self, range: AxisRange) -> bool {
        if !self.auto_y_axis || self.y_range() == range {
            return false;
        }
        self.y_min.show(range.min);
        self.y_max.show(range.max);
        true
    }
    /// Re-applies a freshly selected parameter's defaults. In auto mode the
    /// defaults become the manual backup and `auto_range` is shown.
    pub fn apply_parameter_defaults(
        &mut self,
        defaults: AxisRange,
        label_interval_enabled: bool,
        auto_range: AxisRange,
    ) {
        self.defaults = defaults;
        self.label_interval_enabled = label_interval_enabled;
        self.y_min.commit(defaults.min);
        self.y_max.commit(defaults.max);
        if self.auto_y_axis {
            self.y_min.show(auto_range.min);
            self.y_max.show(auto_range.max);
        }
    }
}
