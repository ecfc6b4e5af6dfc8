// src/types.rs
use std::sync::mpsc::Sender;
use crate::drivers::{ChannelSnapshot, DeviceFamily, Sample, SensorDevice, SensorSelection};
use crate::settings::SettingKind;

// how a group parameter is laid out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartDisplayMode {
    /// All sub-channels overlaid on one chart.
    Multi,
    /// One chart per sub-channel.
    Split,
}

// notifications the core sends to the shell / renderer
#[derive(Clone, Debug, PartialEq)]
pub enum ChartEvent {
    /// No payload; the renderer pulls snapshots itself.
    RedrawRequested,
    ShowBusyRequested(String),
    HideBusyRequested,
    ShowAlertRequested { title: String, message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionOutcome {
    Started,
    Stopped,
    /// The device failed or none was attached; an alert was raised.
    NoEffect,
}

// commands the shell sends to the engine thread
pub enum EngineCommand {
    Attach(Box<dyn SensorDevice>),
    Detach(DeviceFamily),
    ConnectAndStart,
    Stop { disconnect: bool },
    ConfigureSensors(SensorSelection),
    SelectParameter(String),
    SetDisplayMode(ChartDisplayMode),
    EditSetting(SettingKind, String),
    SetAutoYAxis(bool),
    MarkBaseline,
    // externally delivered packet (push-style transports)
    Ingest(Sample),
    Snapshot {
        label: String,
        reply: Sender<Option<ChannelSnapshot>>,
    },
    Shutdown,
}
