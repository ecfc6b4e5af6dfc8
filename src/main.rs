// src/main.rs
use biochart::config::ChartConfig;
use biochart::controller::TelemetryController;
use biochart::drivers::{DeviceFamily, ExgMode, SensorSelection, SimulatedDevice};
use biochart::engine;
use biochart::settings::SettingKind;
use biochart::types::{ChartEvent, EngineCommand};
use log::info;
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;

// Runs the chart core against a simulated board for a few seconds and logs
// what a renderer would draw. Optional first argument: path to a JSON config.
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = match std::env::args().nth(1) {
        Some(path) => ChartConfig::load(&path)?,
        None => ChartConfig::default(),
    };
    info!("starting with {config:?}");

    let (tx_evt, rx_evt) = channel();
    let (tx_cmd, rx_cmd) = channel();
    let controller = TelemetryController::new(config)?.with_events(tx_evt);
    let handle = engine::spawn_thread(controller, rx_cmd);

    let sensors = SensorSelection {
        gyroscope: true,
        low_noise_accel: true,
        exg: Some(ExgMode::Ecg),
        heart_rate: true,
        ..SensorSelection::default()
    };
    let device = SimulatedDevice::new(DeviceFamily::Board, sensors.clone(), 51.2);
    for label in sensors.parameter_labels() {
        info!("parameter: {label}");
    }
    let commands = [
        EngineCommand::Attach(Box::new(device)),
        EngineCommand::SelectParameter("⧉ Gyroscope (separate charts)".into()),
        EngineCommand::SetAutoYAxis(true),
        EngineCommand::EditSetting(SettingKind::SamplingRate, "100".into()),
        EngineCommand::ConnectAndStart,
    ];
    for cmd in commands {
        tx_cmd.send(cmd).map_err(|_| anyhow::anyhow!("engine thread exited early"))?;
    }

    thread::sleep(Duration::from_secs(2));
    for key in ["GyroscopeX", "GyroscopeY", "GyroscopeZ", "HeartRate"] {
        let (reply_tx, reply_rx) = channel();
        tx_cmd
            .send(EngineCommand::Snapshot {
                label: key.into(),
                reply: reply_tx,
            })
            .map_err(|_| anyhow::anyhow!("engine thread exited early"))?;
        match reply_rx.recv_timeout(Duration::from_secs(1))? {
            Some(snap) => info!(
                "{key}: {} points over {} ms, last {:?}",
                snap.len(),
                snap.duration_ms(),
                snap.values.last()
            ),
            None => info!("{key}: no buffer"),
        }
    }

    tx_cmd.send(EngineCommand::Shutdown).ok();
    let controller = handle
        .join()
        .map_err(|_| anyhow::anyhow!("engine thread panicked"))?;
    let alerts = rx_evt
        .try_iter()
        .filter(|e| matches!(e, ChartEvent::ShowAlertRequested { .. }))
        .count();
    for entry in controller.legend() {
        let [r, g, b] = entry.accent.rgb();
        info!("legend {} ({}) #{r:02X}{g:02X}{b:02X}", entry.label, entry.key);
    }
    info!(
        "stopped at {} Hz, y range {:?}, {alerts} alerts",
        controller.sampling().effective_rate_hz(),
        controller.axis().y_range()
    );
    Ok(())
}
