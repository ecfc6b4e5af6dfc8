//! Live biosignal chart core: per-channel sample buffers, parameter
//! topology, editable axis settings and hardware rate negotiation.
pub mod config;
pub mod controller;
pub mod drivers;
pub mod engine;
pub mod settings;
pub mod types;

pub use config::ChartConfig;
pub use controller::{ParameterSelection, TelemetryController};
pub use drivers::{DeviceError, TelemetryError};
pub use types::{ChartDisplayMode, ChartEvent, ConnectionOutcome, EngineCommand};
