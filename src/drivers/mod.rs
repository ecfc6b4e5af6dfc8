pub mod autorange;
pub mod buffer;
pub mod error;
pub mod pipeline;
pub mod rate;
pub mod source;
pub mod topology;
// Re-exported so callers can reach the common types directly.
pub use autorange::{compute_auto_range, AxisRange};
pub use buffer::{ChannelBuffer, ChannelSnapshot, ChannelStore};
pub use error::{DeviceError, TelemetryError};
pub use pipeline::{IngestReport, SamplePipeline, SamplingState};
pub use rate::{negotiate, quantize_sampling_rate, AttachedDevices, Negotiation, DEFAULT_CLOCK_HZ};
pub use source::{
    Axis3, BoardSample, DeviceFamily, ExgMode, Sample, SensorDevice, SensorSelection,
    SimulatedDevice, WristbandSample,
};
pub use topology::{Accent, LegendEntry, ParameterProfile};
