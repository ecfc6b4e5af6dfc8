use std::sync::mpsc::Sender;
use log::{debug, info, warn};
use crate::config::ChartConfig;
use crate::drivers::error::{DeviceError, TelemetryError};
use crate::drivers::rate::{self, AttachedDevices, Negotiation};
use crate::drivers::topology::{self, LegendEntry, ParameterProfile};
use crate::drivers::{
    compute_auto_range, AxisRange, ChannelSnapshot, ChannelStore, DeviceFamily, IngestReport,
    Sample, SamplePipeline, SamplingState, SensorDevice, SensorSelection,
};
use crate::settings::{
    parse_sampling_rate, stage_edit, AxisConfiguration, CommitOutcome, EditableSetting,
    SettingKind, Staged,
};
use crate::types::{ChartDisplayMode, ChartEvent, ConnectionOutcome};
/// The parameter currently on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSelection {
    pub raw_label: String,
    pub name: String,
    pub mode: ChartDisplayMode,
}
impl ParameterSelection {
    fn from_label(label: &str) -> Self {
        let name = topology::clean_name(label);
        let mode = if topology::is_group(&name) && topology::is_split_variant(label) {
            ChartDisplayMode::Split
        } else {
            ChartDisplayMode::Multi
        };
        Self {
            raw_label: label.to_string(),
            name,
            mode,
        }
    }
}
/// Owns the buffers and every setting. All mutation goes through `&mut self`,
/// so whoever holds the controller is the single writer.
pub struct TelemetryController {
    config: ChartConfig,
    sensors: SensorSelection,
    store: ChannelStore,
    sampling: SamplingState,
    pipeline: SamplePipeline,
    axis: AxisConfiguration,
    sampling_rate: EditableSetting<f64>,
    selection: ParameterSelection,
    profile: ParameterProfile,
    devices: AttachedDevices,
    validation_message: String,
    streaming: bool,
    events: Option<Sender<ChartEvent>>,
}
impl TelemetryController {
    /// Fails when `config` is outside the limits the editors enforce.
    pub fn new(config: ChartConfig) -> Result<Self, TelemetryError> {
        config.validate()?;
        let selection = ParameterSelection::from_label(&config.initial_parameter);
        let profile = topology::profile_for(&selection.name);
        let mut axis = AxisConfiguration::new(&config, profile.default_range);
        axis.apply_parameter_defaults(
            profile.default_range,
            !topology::is_heart_rate(&selection.name),
            profile.default_range,
        );
        if config.auto_y_axis {
            axis.set_auto_y_axis(true, profile.default_range);
        }
        Ok(Self {
            sensors: SensorSelection::default(),
            store: ChannelStore::new(config.time_window_seconds as usize),
            sampling: SamplingState::new(config.sampling_rate_hz),
            pipeline: SamplePipeline::new(config.heart_rate_min_bpm, config.heart_rate_max_bpm),
            sampling_rate: EditableSetting::new(config.sampling_rate_hz),
            axis,
            selection,
            profile,
            devices: AttachedDevices::default(),
            validation_message: String::new(),
            streaming: false,
            events: None,
            config,
        })
    }
    pub fn with_events(mut self, events: Sender<ChartEvent>) -> Self {
        self.events = Some(events);
        self
    }
    fn emit(&self, event: ChartEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }
    fn request_redraw(&self) {
        self.emit(ChartEvent::RedrawRequested);
    }
    fn alert(&self, title: &str, message: String) {
        self.emit(ChartEvent::ShowAlertRequested {
            title: title.to_string(),
            message,
        });
    }
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }
    pub fn sensors(&self) -> &SensorSelection {
        &self.sensors
    }
    pub fn sampling(&self) -> &SamplingState {
        &self.sampling
    }
    pub fn axis(&self) -> &AxisConfiguration {
        &self.axis
    }
    pub fn sampling_rate_setting(&self) -> &EditableSetting<f64> {
        &self.sampling_rate
    }
    pub fn selection(&self) -> &ParameterSelection {
        &self.selection
    }
    pub fn profile(&self) -> &ParameterProfile {
        &self.profile
    }
    pub fn validation_message(&self) -> &str {
        &self.validation_message
    }
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }
    pub fn active_device(&self) -> Option<DeviceFamily> {
        self.devices.active().map(|d| d.family())
    }
    pub fn channel_keys(&self) -> Vec<String> {
        self.store.keys().map(String::from).collect()
    }
    // ---- sensor topology ----
    /// Creates buffers for channels that became available and destroys the
    /// ones that disappeared. Surviving buffers keep their data.
    pub fn configure_sensors(&mut self, sensors: SensorSelection) {
        let keys = sensors.channel_keys();
        self.store.sync_channels(keys.iter().map(String::as_str));
        debug!("sensor configuration now provides {} channels", keys.len());
        self.sensors = sensors;
        self.request_redraw();
    }
    pub fn available_parameters(&self) -> Vec<String> {
        self.sensors.parameter_labels()
    }
    // ---- ingestion ----
    pub fn on_sample(&mut self, sample: &Sample) -> IngestReport {
        let report = self.pipeline.ingest(
            sample,
            &mut self.store,
            &mut self.sampling,
            self.axis.time_window_points(),
        );
        self.request_redraw();
        report
    }
    /// Pulls one packet from the active device while streaming. Device
    /// failures stop the stream and raise an alert.
    pub fn poll_device(&mut self) -> Option<IngestReport> {
        if !self.streaming {
            return None;
        }
        let next = self.devices.active_mut()?.next_sample();
        match next {
            Ok(Some(sample)) => Some(self.on_sample(&sample)),
            Ok(None) => None,
            Err(err) => {
                warn!("device read failed: {err}");
                self.streaming = false;
                self.alert("Streaming stopped", err.to_string());
                None
            }
        }
    }
    // ---- parameter selection ----
    pub fn select_parameter(&mut self, label: &str) {
        self.selection = ParameterSelection::from_label(label);
        self.profile = topology::profile_for(&self.selection.name);
        let defaults = self.profile.default_range;
        let auto_range = self.auto_range(defaults);
        self.axis.apply_parameter_defaults(
            defaults,
            !topology::is_heart_rate(&self.selection.name),
            auto_range,
        );
        self.validation_message.clear();
        debug!(
            "selected {} ({:?}) -> {:?}",
            self.selection.name,
            self.selection.mode,
            self.selected_channels()
        );
        self.request_redraw();
    }
    /// Switches between overlaid and per-channel charts; singles stay `Multi`.
    pub fn set_display_mode(&mut self, mode: ChartDisplayMode) -> bool {
        if !topology::is_group(&self.selection.name) || self.selection.mode == mode {
            return false;
        }
        self.selection.mode = mode;
        self.request_redraw();
        true
    }
    pub fn selected_channels(&self) -> Vec<String> {
        topology::resolve_channels(&self.selection.name)
    }
    pub fn legend(&self) -> Vec<LegendEntry> {
        topology::legend_entries(&self.selection.name)
    }
    // ---- axis ----
    fn auto_range(&self, fallback: AxisRange) -> AxisRange {
        let keys = self.selected_channels();
        compute_auto_range(keys.iter().filter_map(|k| self.store.get(k)), fallback)
    }
    pub fn set_auto_y_axis(&mut self, enabled: bool) {
        let auto_range = self.auto_range(self.axis.default_range());
        if self.axis.set_auto_y_axis(enabled, auto_range) {
            self.validation_message.clear();
            self.request_redraw();
        }
    }
    /// Recomputes the auto range from current data. Only effective in auto mode.
    pub fn refresh_auto_range(&mut self) -> bool {
        if !self.axis.auto_y_axis() {
            return false;
        }
        let auto_range = self.auto_range(self.axis.default_range());
        let changed = self.axis.apply_auto_range(auto_range);
        if changed {
            self.request_redraw();
        }
        changed
    }
    // ---- text edits ----
    pub fn edit_setting(&mut self, kind: SettingKind, text: &str) -> CommitOutcome {
        match kind {
            SettingKind::YAxisMin => self.set_y_axis_min_text(text),
            SettingKind::YAxisMax => self.set_y_axis_max_text(text),
            SettingKind::TimeWindow => self.set_time_window_text(text),
            SettingKind::XAxisLabelInterval => self.set_x_axis_label_interval_text(text),
            SettingKind::SamplingRate => self.set_sampling_rate_text(text),
        }
    }
    pub fn set_y_axis_min_text(&mut self, text: &str) -> CommitOutcome {
        let outcome = self.axis.edit_y_min(text);
        self.finish_edit(SettingKind::YAxisMin, outcome)
    }
    pub fn set_y_axis_max_text(&mut self, text: &str) -> CommitOutcome {
        let outcome = self.axis.edit_y_max(text);
        self.finish_edit(SettingKind::YAxisMax, outcome)
    }
    /// A new window clears every buffer and restarts the sample clock.
    pub fn set_time_window_text(&mut self, text: &str) -> CommitOutcome {
        let outcome = self.axis.edit_time_window(text);
        if outcome.changed() {
            let points = self.axis.time_window_points();
            self.store.clear_all();
            self.store.set_capacity_hint(points);
            self.sampling.reset();
        }
        self.finish_edit(SettingKind::TimeWindow, outcome)
    }
    pub fn set_x_axis_label_interval_text(&mut self, text: &str) -> CommitOutcome {
        let outcome = self.axis.edit_label_interval(text);
        self.finish_edit(SettingKind::XAxisLabelInterval, outcome)
    }
    pub fn set_sampling_rate_text(&mut self, text: &str) -> CommitOutcome {
        let outcome = match stage_edit(&mut self.sampling_rate, text, parse_sampling_rate) {
            Staged::Pending => CommitOutcome::Pending,
            Staged::Invalid(err) => CommitOutcome::Rejected(err),
            Staged::Blank => self.apply_rate_edit(self.config.sampling_rate_hz, CommitOutcome::Reset),
            Staged::Parsed(hz) => self.apply_rate_edit(hz, CommitOutcome::Committed),
        };
        self.finish_edit(SettingKind::SamplingRate, outcome)
    }
    fn apply_rate_edit(&mut self, requested_hz: f64, success: CommitOutcome) -> CommitOutcome {
        match self.negotiate_sampling_rate(requested_hz) {
            Ok(negotiation) if negotiation.effective_rate().is_some() => success,
            Ok(_) => {
                self.sampling_rate.reject();
                CommitOutcome::NoEffect
            }
            Err(err) => {
                warn!("sampling rate {requested_hz} Hz not applied: {err}");
                self.sampling_rate.reject();
                CommitOutcome::NoEffect
            }
        }
    }
    fn finish_edit(&mut self, kind: SettingKind, outcome: CommitOutcome) -> CommitOutcome {
        match &outcome {
            CommitOutcome::Ignored | CommitOutcome::Pending | CommitOutcome::NoEffect => {}
            CommitOutcome::Reset | CommitOutcome::Committed => {
                self.validation_message.clear();
                self.request_redraw();
            }
            CommitOutcome::Rejected(err) => {
                warn!("rejected {kind} edit: {err}");
                self.validation_message = err.to_string();
            }
        }
        outcome
    }
    // ---- sampling rate ----
    /// Asks the active device for `requested_hz`. On success the new rate
    /// governs timestamps from zero and every buffer is cleared; a device
    /// failure raises an alert and leaves everything as it was. The device
    /// round-trip is bracketed by busy events so the shell can disable the
    /// rate control; the engine thread runs one negotiation at a time.
    pub fn negotiate_sampling_rate(
        &mut self,
        requested_hz: f64,
    ) -> Result<Negotiation, TelemetryError> {
        if !is_usable_rate(requested_hz) {
            return Err(TelemetryError::InvalidSampleRate(requested_hz));
        }
        let round_trip = !self.devices.is_empty();
        if round_trip {
            self.emit(ChartEvent::ShowBusyRequested("Applying sampling rate...".into()));
        }
        let result = rate::negotiate(&mut self.devices, requested_hz);
        if round_trip {
            self.emit(ChartEvent::HideBusyRequested);
        }
        let negotiation = result?;
        match &negotiation {
            Negotiation::NoEffect(err) => {
                self.alert("Sampling rate not changed", err.to_string());
            }
            _ => {
                if let Some(applied_hz) = negotiation.effective_rate() {
                    self.rebase_timeline(applied_hz);
                    info!("sampling rate now {applied_hz} Hz (requested {requested_hz} Hz)");
                }
            }
        }
        Ok(negotiation)
    }
    fn rebase_timeline(&mut self, rate_hz: f64) {
        self.sampling.set_effective_rate(rate_hz);
        self.sampling_rate.commit(rate_hz);
        self.store.clear_all();
        self.request_redraw();
    }
    /// Restarts the visible clock at zero; buffered points are kept.
    pub fn mark_baseline(&mut self) {
        self.sampling.mark_baseline();
        self.request_redraw();
    }
    // ---- device life cycle ----
    pub fn attach_device(&mut self, device: Box<dyn SensorDevice>) {
        let family = device.family();
        info!("attaching {} ({family:?})", device.name());
        if let Some(previous) = self.devices.attach(device) {
            debug!("replaced {}", previous.name());
        }
        if self.active_device() == Some(family) {
            self.adopt_active_device();
        }
    }
    pub fn detach_device(&mut self, family: DeviceFamily) -> Option<Box<dyn SensorDevice>> {
        let was_active = self.active_device() == Some(family);
        let detached = self.devices.detach(family)?;
        info!("detached {}", detached.name());
        if was_active {
            self.streaming = false;
            if !self.devices.is_empty() {
                self.adopt_active_device();
            }
        }
        Some(detached)
    }
    fn adopt_active_device(&mut self) {
        let Some(device) = self.devices.active() else {
            return;
        };
        let sensors = device.enabled_sensors();
        let rate_hz = device.sampling_rate_hz();
        let name = device.name().to_string();
        self.configure_sensors(sensors);
        if is_usable_rate(rate_hz) {
            self.rebase_timeline(rate_hz);
        } else {
            warn!(
                "{name} reports sampling rate {rate_hz} Hz; keeping {} Hz",
                self.sampling.effective_rate_hz()
            );
        }
    }
    pub fn connect_and_start(&mut self) -> ConnectionOutcome {
        self.emit(ChartEvent::ShowBusyRequested("Connecting...".into()));
        let result = start_active(&mut self.devices);
        self.emit(ChartEvent::HideBusyRequested);
        match result {
            Ok(name) => {
                info!("{name} streaming");
                self.streaming = true;
                self.sampling.reset();
                self.store.clear_all();
                self.request_redraw();
                ConnectionOutcome::Started
            }
            Err(err) => {
                warn!("connect failed: {err}");
                self.alert("Connection failed", err.to_string());
                ConnectionOutcome::NoEffect
            }
        }
    }
    pub fn stop(&mut self, disconnect: bool) -> ConnectionOutcome {
        self.emit(ChartEvent::ShowBusyRequested(
            if disconnect { "Disconnecting..." } else { "Stopping..." }.into(),
        ));
        let result = stop_active(&mut self.devices, disconnect);
        self.emit(ChartEvent::HideBusyRequested);
        self.streaming = false;
        match result {
            Ok(()) => ConnectionOutcome::Stopped,
            Err(err) => {
                warn!("stop failed: {err}");
                self.alert("Stop failed", err.to_string());
                ConnectionOutcome::NoEffect
            }
        }
    }
    // ---- renderer access ----
    /// Independent copy of a channel's history; `label` may be adorned.
    pub fn snapshot(&self, label: &str) -> Option<ChannelSnapshot> {
        self.store.snapshot(&topology::map_to_storage_key(label))
    }
    pub fn selected_snapshots(&self) -> Vec<ChannelSnapshot> {
        self.selected_channels()
            .iter()
            .filter_map(|key| self.store.snapshot(key))
            .collect()
    }
}
fn is_usable_rate(rate_hz: f64) -> bool {
    rate_hz.is_finite() && rate_hz > 0.0
}
fn start_active(devices: &mut AttachedDevices) -> Result<String, DeviceError> {
    let device = devices.active_mut().ok_or(DeviceError::NotAttached)?;
    device.connect()?;
    device.start_streaming()?;
    Ok(device.name().to_string())
}
fn stop_active(devices: &mut AttachedDevices, disconnect: bool) -> Result<(), DeviceError> {
    let device = devices.active_mut().ok_or(DeviceError::NotAttached)?;
    device.stop_streaming()?;
    if disconnect {
        device.disconnect()?;
    }
    Ok(())
}
#[cfg(test)]
mod tests {
    use std::sync::mpsc::{channel, Receiver};
    use super::*;
    use crate::drivers::source::{Axis3, BoardSample, SimulatedDevice};
    use crate::settings::ValidationError;
    fn gyro(v: f64) -> Sample {
        Sample::Board(BoardSample {
            gyroscope: Some(Axis3::new(v, -v, v * 2.0)),
            ..BoardSample::default()
        })
    }
    fn gyro_controller() -> (TelemetryController, Receiver<ChartEvent>) {
        let (tx, rx) = channel();
        let mut controller = TelemetryController::new(ChartConfig::default())
            .unwrap()
            .with_events(tx);
        controller.configure_sensors(SensorSelection::gyroscope_only());
        (controller, rx)
    }
    fn redraws(rx: &Receiver<ChartEvent>) -> usize {
        rx.try_iter()
            .filter(|e| *e == ChartEvent::RedrawRequested)
            .count()
    }
    struct FlakyDevice {
        rate_hz: f64,
    }
    impl SensorDevice for FlakyDevice {
        fn family(&self) -> DeviceFamily {
            DeviceFamily::Board
        }
        fn name(&self) -> &str {
            "flaky"
        }
        fn connect(&mut self) -> Result<(), DeviceError> {
            Err(DeviceError::Transport("link lost".into()))
        }
        fn start_streaming(&mut self) -> Result<(), DeviceError> {
            Ok(())
        }
        fn stop_streaming(&mut self) -> Result<(), DeviceError> {
            Err(DeviceError::Transport("link lost".into()))
        }
        fn disconnect(&mut self) -> Result<(), DeviceError> {
            Ok(())
        }
        fn enabled_sensors(&self) -> SensorSelection {
            SensorSelection::gyroscope_only()
        }
        fn sampling_rate_hz(&self) -> f64 {
            self.rate_hz
        }
        fn set_sampling_rate(&mut self, _requested_hz: f64) -> Result<f64, DeviceError> {
            Err(DeviceError::Transport("link lost".into()))
        }
        fn next_sample(&mut self) -> Result<Option<Sample>, DeviceError> {
            Err(DeviceError::Transport("link lost".into()))
        }
    }
    #[test]
    fn gyroscope_window_evicts_oldest_samples() {
        let (mut controller, rx) = gyro_controller();
        controller.select_parameter("Gyroscope");
        assert!(!controller.axis().auto_y_axis());
        assert_eq!(controller.axis().y_range(), AxisRange::new(-250.0, 250.0));
        for i in 0..25 {
            controller.on_sample(&gyro(i as f64));
        }
        let snapshots = controller.selected_snapshots();
        assert_eq!(snapshots.len(), 3);
        for snap in &snapshots {
            assert_eq!(snap.len(), 20);
            assert_eq!(snap.timestamps_ms.len(), 20);
        }
        let x = controller.snapshot("GyroscopeX").unwrap();
        assert_eq!(x.values.first(), Some(&5.0));
        assert_eq!(x.values.last(), Some(&24.0));
        assert!(redraws(&rx) >= 25);
    }
    #[test]
    fn time_window_commit_clears_and_resets_counter() {
        let (mut controller, rx) = gyro_controller();
        for i in 0..15 {
            controller.on_sample(&gyro(i as f64));
        }
        redraws(&rx);
        assert_eq!(controller.set_time_window_text("10"), CommitOutcome::Committed);
        assert_eq!(controller.sampling().sample_counter(), 0);
        assert!(controller.snapshot("GyroscopeZ").unwrap().is_empty());
        assert_eq!(redraws(&rx), 1);
        for i in 0..15 {
            controller.on_sample(&gyro(i as f64));
        }
        assert_eq!(controller.snapshot("GyroscopeZ").unwrap().len(), 10);
    }
    #[test]
    fn blank_time_window_resets_default_and_clears() {
        let (mut controller, rx) = gyro_controller();
        controller.set_time_window_text("50");
        for i in 0..30 {
            controller.on_sample(&gyro(i as f64));
        }
        assert_eq!(controller.snapshot("GyroscopeX").unwrap().len(), 30);
        redraws(&rx);
        assert_eq!(controller.set_time_window_text("  "), CommitOutcome::Reset);
        assert_eq!(controller.axis().time_window().value(), 20);
        assert_eq!(controller.sampling().sample_counter(), 0);
        for snap in controller.selected_snapshots() {
            assert!(snap.is_empty());
        }
        assert_eq!(redraws(&rx), 1);
        assert_eq!(controller.set_time_window_text(""), CommitOutcome::Reset);
        assert_eq!(controller.axis().time_window().value(), 20);
    }
    #[test]
    fn invalid_config_is_refused() {
        let zero_rate = ChartConfig {
            sampling_rate_hz: 0.0,
            ..ChartConfig::default()
        };
        assert!(matches!(
            TelemetryController::new(zero_rate),
            Err(TelemetryError::InvalidConfig(_))
        ));
        let zero_window = ChartConfig {
            time_window_seconds: 0,
            ..ChartConfig::default()
        };
        assert!(TelemetryController::new(zero_window).is_err());
    }
    #[test]
    fn unusable_device_rate_keeps_current_rate() {
        let (mut controller, _rx) = gyro_controller();
        controller.attach_device(Box::new(FlakyDevice { rate_hz: 0.0 }));
        assert_eq!(controller.active_device(), Some(DeviceFamily::Board));
        assert_eq!(controller.sampling().effective_rate_hz(), 51.2);
        controller.attach_device(Box::new(FlakyDevice { rate_hz: f64::NAN }));
        assert_eq!(controller.sampling().effective_rate_hz(), 51.2);
        assert!(matches!(
            controller.negotiate_sampling_rate(f64::INFINITY),
            Err(TelemetryError::InvalidSampleRate(_))
        ));
        controller.on_sample(&gyro(1.0));
        assert_eq!(controller.snapshot("GyroscopeX").unwrap().timestamps_ms, vec![19]);
    }
    #[test]
    fn rejected_edit_sets_message_without_redraw() {
        let (mut controller, rx) = gyro_controller();
        controller.select_parameter("Gyroscope");
        redraws(&rx);
        let outcome = controller.set_y_axis_max_text("-300");
        assert_eq!(outcome, CommitOutcome::Rejected(ValidationError::MinNotBelowMax));
        assert_eq!(
            controller.validation_message(),
            "Y-axis minimum must be less than the maximum"
        );
        assert_eq!(controller.axis().y_max().text(), "250");
        assert_eq!(redraws(&rx), 0);
        controller.set_y_axis_max_text("300");
        assert!(controller.validation_message().is_empty());
        assert_eq!(redraws(&rx), 1);
    }
    #[test]
    fn auto_mode_ignores_manual_bounds_silently() {
        let (mut controller, rx) = gyro_controller();
        controller.select_parameter("Gyroscope");
        controller.on_sample(&gyro(10.0));
        controller.set_auto_y_axis(true);
        assert_eq!(controller.axis().y_range(), AxisRange::new(-13.0, 23.0));
        redraws(&rx);
        assert_eq!(controller.set_y_axis_min_text("abc"), CommitOutcome::Ignored);
        assert!(controller.validation_message().is_empty());
        assert_eq!(redraws(&rx), 0);
        controller.on_sample(&gyro(20.0));
        assert!(controller.refresh_auto_range());
        controller.set_auto_y_axis(false);
        assert_eq!(controller.axis().y_range(), AxisRange::new(-250.0, 250.0));
    }
    #[test]
    fn split_variant_sets_display_mode() {
        let (mut controller, _rx) = gyro_controller();
        controller.select_parameter("⧉ Gyroscope (separate charts)");
        assert_eq!(controller.selection().name, "Gyroscope");
        assert_eq!(controller.selection().mode, ChartDisplayMode::Split);
        assert!(controller.set_display_mode(ChartDisplayMode::Multi));
        controller.select_parameter("GyroscopeX");
        assert_eq!(controller.selection().mode, ChartDisplayMode::Multi);
        assert!(!controller.set_display_mode(ChartDisplayMode::Split));
        assert_eq!(controller.legend()[0].label, "GyroscopeX");
        assert_eq!(controller.profile().title, "Gyroscope X");
    }
    #[test]
    fn heart_rate_disables_label_interval() {
        let (mut controller, _rx) = gyro_controller();
        controller.select_parameter("HeartRate");
        assert!(!controller.axis().label_interval_enabled());
        assert_eq!(
            controller.set_x_axis_label_interval_text("7"),
            CommitOutcome::Ignored
        );
        controller.select_parameter("Gyroscope");
        assert_eq!(
            controller.set_x_axis_label_interval_text("7"),
            CommitOutcome::Committed
        );
    }
    #[test]
    fn rate_change_rebases_timeline() {
        let (mut controller, _rx) = gyro_controller();
        controller.attach_device(Box::new(SimulatedDevice::new(
            DeviceFamily::Board,
            SensorSelection::gyroscope_only(),
            51.2,
        )));
        for i in 0..5 {
            controller.on_sample(&gyro(i as f64));
        }
        assert_eq!(controller.set_sampling_rate_text("100"), CommitOutcome::Committed);
        let applied = 32768.0 / 328.0;
        assert_eq!(controller.sampling().effective_rate_hz(), applied);
        assert_eq!(controller.sampling_rate_setting().value(), applied);
        assert_eq!(controller.sampling().sample_counter(), 0);
        assert!(controller.snapshot("GyroscopeX").unwrap().is_empty());
        assert!(matches!(
            controller.set_sampling_rate_text("5000"),
            CommitOutcome::Rejected(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            controller.negotiate_sampling_rate(0.0),
            Err(TelemetryError::InvalidSampleRate(_))
        ));
    }
    #[test]
    fn device_failures_become_alerts() {
        let (mut controller, rx) = gyro_controller();
        controller.attach_device(Box::new(FlakyDevice { rate_hz: 51.2 }));
        redraws(&rx);
        assert_eq!(controller.connect_and_start(), ConnectionOutcome::NoEffect);
        assert_eq!(controller.set_sampling_rate_text("100"), CommitOutcome::NoEffect);
        assert_eq!(controller.sampling_rate_setting().text(), "51.2");
        assert_eq!(controller.stop(true), ConnectionOutcome::NoEffect);
        let events: Vec<ChartEvent> = rx.try_iter().collect();
        assert_eq!(events[0], ChartEvent::ShowBusyRequested("Connecting...".into()));
        assert_eq!(events[1], ChartEvent::HideBusyRequested);
        let rate_busy = ChartEvent::ShowBusyRequested("Applying sampling rate...".into());
        let busy_at = events.iter().position(|e| *e == rate_busy).unwrap();
        assert_eq!(events[busy_at + 1], ChartEvent::HideBusyRequested);
        let alerts = events
            .iter()
            .filter(|e| matches!(e, ChartEvent::ShowAlertRequested { .. }))
            .count();
        assert_eq!(alerts, 3);
    }
    #[test]
    fn attach_adopts_sensors_and_detach_falls_back() {
        let (mut controller, _rx) = gyro_controller();
        let band = SensorSelection {
            low_noise_accel: true,
            heart_rate: true,
            ..SensorSelection::default()
        };
        controller.attach_device(Box::new(SimulatedDevice::new(DeviceFamily::Wristband, band, 25.6)));
        assert_eq!(controller.active_device(), Some(DeviceFamily::Wristband));
        assert!(controller.channel_keys().contains(&"HeartRate".to_string()));
        assert!(!controller.channel_keys().contains(&"GyroscopeX".to_string()));
        controller.attach_device(Box::new(SimulatedDevice::new(
            DeviceFamily::Board,
            SensorSelection::gyroscope_only(),
            51.2,
        )));
        assert_eq!(controller.active_device(), Some(DeviceFamily::Board));
        assert_eq!(controller.sampling().effective_rate_hz(), 51.2);
        controller.detach_device(DeviceFamily::Board);
        assert_eq!(controller.active_device(), Some(DeviceFamily::Wristband));
        assert_eq!(controller.sampling().effective_rate_hz(), 25.6);
    }
    #[test]
    fn streaming_polls_the_active_device() {
        let (mut controller, _rx) = gyro_controller();
        controller.attach_device(Box::new(SimulatedDevice::new(
            DeviceFamily::Board,
            SensorSelection::gyroscope_only(),
            51.2,
        )));
        assert!(controller.poll_device().is_none());
        assert_eq!(controller.connect_and_start(), ConnectionOutcome::Started);
        for _ in 0..30 {
            controller.poll_device();
        }
        assert_eq!(controller.snapshot("GyroscopeY").unwrap().len(), 20);
        controller.mark_baseline();
        let report = controller.poll_device().unwrap();
        assert_eq!(report.timestamp_ms, 20);
        assert_eq!(controller.stop(true), ConnectionOutcome::Stopped);
        assert!(!controller.is_streaming());
    }
}
