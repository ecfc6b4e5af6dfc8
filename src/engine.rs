// src/engine.rs
use crate::controller::TelemetryController;
use crate::types::*;
use log::{debug, info};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// commands handled per tick before the device gets polled again
const MAX_COMMANDS_PER_TICK: usize = 10;
const IDLE_SLEEP_MS: u64 = 50;

/// Runs the controller on its own thread. The thread is the only writer;
/// the shell talks to it through `rx_cmd` and hears back through the
/// controller's event sender. Returns the controller on shutdown.
pub fn spawn_thread(
    mut controller: TelemetryController,
    rx_cmd: Receiver<EngineCommand>,
) -> JoinHandle<TelemetryController> {
    thread::spawn(move || {
        info!("chart engine ready");
        let poll_interval = Duration::from_millis(controller.config().poll_interval_ms);
        loop {
            // 1. drain pending commands
            for _ in 0..MAX_COMMANDS_PER_TICK {
                match rx_cmd.try_recv() {
                    Ok(EngineCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                        info!("chart engine stopping");
                        if controller.is_streaming() {
                            controller.stop(true);
                        }
                        return controller;
                    }
                    Ok(cmd) => handle_command(&mut controller, cmd),
                    Err(TryRecvError::Empty) => break,
                }
            }

            // 2. stream
            if controller.is_streaming() {
                controller.poll_device();
                controller.refresh_auto_range();
                thread::sleep(poll_interval);
            } else {
                thread::sleep(Duration::from_millis(IDLE_SLEEP_MS));
            }
        }
    })
}

fn handle_command(controller: &mut TelemetryController, cmd: EngineCommand) {
    match cmd {
        EngineCommand::Attach(device) => controller.attach_device(device),
        EngineCommand::Detach(family) => {
            controller.detach_device(family);
        }
        EngineCommand::ConnectAndStart => {
            controller.connect_and_start();
        }
        EngineCommand::Stop { disconnect } => {
            controller.stop(disconnect);
        }
        EngineCommand::ConfigureSensors(sensors) => controller.configure_sensors(sensors),
        EngineCommand::SelectParameter(label) => controller.select_parameter(&label),
        EngineCommand::SetDisplayMode(mode) => {
            controller.set_display_mode(mode);
        }
        EngineCommand::EditSetting(kind, text) => {
            let outcome = controller.edit_setting(kind, &text);
            debug!("{kind} edit {text:?} -> {outcome:?}");
        }
        EngineCommand::SetAutoYAxis(enabled) => controller.set_auto_y_axis(enabled),
        EngineCommand::MarkBaseline => controller.mark_baseline(),
        EngineCommand::Ingest(sample) => {
            controller.on_sample(&sample);
        }
        EngineCommand::Snapshot { label, reply } => {
            reply.send(controller.snapshot(&label)).ok();
        }
        EngineCommand::Shutdown => {}
    }
}
