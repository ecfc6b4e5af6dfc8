use log::trace;
use crate::drivers::buffer::ChannelStore;
use crate::drivers::source::Sample;
use crate::drivers::topology::HEART_RATE;
/// Negotiated rate, running sample count and the rebasable time origin.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingState {
    effective_rate_hz: f64,
    sample_counter: u64,
    baseline_offset_secs: f64,
}
impl SamplingState {
    pub fn new(effective_rate_hz: f64) -> Self {
        Self {
            effective_rate_hz,
            sample_counter: 0,
            baseline_offset_secs: 0.0,
        }
    }
    pub fn effective_rate_hz(&self) -> f64 {
        self.effective_rate_hz
    }
    pub fn sample_counter(&self) -> u64 {
        self.sample_counter
    }
    pub fn baseline_offset_secs(&self) -> f64 {
        self.baseline_offset_secs
    }
    pub fn elapsed_secs(&self) -> f64 {
        self.sample_counter as f64 / self.effective_rate_hz
    }
    /// Timestamp of the most recently counted sample, relative to the baseline.
    pub fn current_timestamp_ms(&self) -> i64 {
        let elapsed_ms = (self.sample_counter as f64 * 1000.0 / self.effective_rate_hz) as i64;
        let baseline_ms = (self.baseline_offset_secs * 1000.0) as i64;
        (elapsed_ms - baseline_ms).max(0)
    }
    /// Restarts the visible clock at zero without touching buffered points.
    pub fn mark_baseline(&mut self) {
        self.baseline_offset_secs = self.elapsed_secs();
    }
    pub fn reset(&mut self) {
        self.sample_counter = 0;
        self.baseline_offset_secs = 0.0;
    }
    pub fn set_effective_rate(&mut self, rate_hz: f64) {
        self.effective_rate_hz = rate_hz;
        self.reset();
    }
    fn advance(&mut self) -> i64 {
        self.sample_counter += 1;
        self.current_timestamp_ms()
    }
}
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub timestamp_ms: i64,
    pub appended: usize,
    pub skipped: usize,
    pub evicted: usize,
}
/// Appends one raw sample into every enabled channel's buffer. This is the
/// only writer that appends; everything else clears or trims.
#[derive(Clone, Debug)]
pub struct SamplePipeline {
    heart_rate_bpm: (f64, f64),
}
impl SamplePipeline {
    pub fn new(heart_rate_min_bpm: f64, heart_rate_max_bpm: f64) -> Self {
        Self {
            heart_rate_bpm: (heart_rate_min_bpm, heart_rate_max_bpm),
        }
    }
    pub fn ingest(
        &self,
        sample: &Sample,
        store: &mut ChannelStore,
        sampling: &mut SamplingState,
        window_points: usize,
    ) -> IngestReport {
        let timestamp_ms = sampling.advance();
        let mut report = IngestReport {
            timestamp_ms,
            ..IngestReport::default()
        };
        for (key, buffer) in store.iter_mut() {
            let Some(value) = sample.channel_value(key) else {
                report.skipped += 1;
                continue;
            };
            if key == HEART_RATE && !self.plausible_heart_rate(value) {
                trace!("dropping implausible heart rate {value}");
                report.skipped += 1;
                continue;
            }
            buffer.push(value, timestamp_ms);
            report.appended += 1;
            report.evicted += buffer.trim_to(window_points);
        }
        report
    }
    fn plausible_heart_rate(&self, bpm: f64) -> bool {
        let (lo, hi) = self.heart_rate_bpm;
        (lo..=hi).contains(&bpm)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::source::{Axis3, BoardSample, SensorSelection};
    fn store_for(sensors: &SensorSelection) -> ChannelStore {
        let keys = sensors.channel_keys();
        let mut store = ChannelStore::new(20);
        store.sync_channels(keys.iter().map(String::as_str));
        store
    }
    fn gyro_sample(v: f64) -> Sample {
        Sample::Board(BoardSample {
            gyroscope: Some(Axis3::new(v, v + 1.0, v + 2.0)),
            ..BoardSample::default()
        })
    }
    #[test]
    fn timestamps_follow_counter_and_rate() {
        let mut store = store_for(&SensorSelection::gyroscope_only());
        let mut sampling = SamplingState::new(50.0);
        let pipeline = SamplePipeline::new(30.0, 220.0);
        for i in 0..3 {
            pipeline.ingest(&gyro_sample(i as f64), &mut store, &mut sampling, 20);
        }
        let snap = store.snapshot("GyroscopeY").unwrap();
        assert_eq!(snap.timestamps_ms, vec![20, 40, 60]);
        assert_eq!(snap.values, vec![1.0, 2.0, 3.0]);
        assert_eq!(sampling.sample_counter(), 3);
    }
    #[test]
    fn buffers_are_capped_by_point_count() {
        let mut store = store_for(&SensorSelection::gyroscope_only());
        let mut sampling = SamplingState::new(51.2);
        let pipeline = SamplePipeline::new(30.0, 220.0);
        let mut evicted = 0;
        for i in 0..8 {
            evicted += pipeline
                .ingest(&gyro_sample(i as f64), &mut store, &mut sampling, 5)
                .evicted;
        }
        assert_eq!(evicted, 9);
        let snap = store.snapshot("GyroscopeX").unwrap();
        assert_eq!(snap.values, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    }
    #[test]
    fn missing_fields_skip_only_their_channel() {
        let sensors = SensorSelection {
            gyroscope: true,
            battery: true,
            ..SensorSelection::default()
        };
        let mut store = store_for(&sensors);
        let mut sampling = SamplingState::new(10.0);
        let pipeline = SamplePipeline::new(30.0, 220.0);
        let report = pipeline.ingest(&gyro_sample(1.0), &mut store, &mut sampling, 20);
        assert_eq!(report.appended, 3);
        assert_eq!(report.skipped, 1);
        assert!(store.get("BatteryVoltage").unwrap().is_empty());
    }
    #[test]
    fn implausible_heart_rate_is_dropped() {
        let sensors = SensorSelection {
            heart_rate: true,
            ..SensorSelection::default()
        };
        let mut store = store_for(&sensors);
        let mut sampling = SamplingState::new(1.0);
        let pipeline = SamplePipeline::new(30.0, 220.0);
        for bpm in [72.0, 0.0, 400.0, 30.0] {
            let sample = Sample::Board(BoardSample {
                heart_rate: Some(bpm),
                ..BoardSample::default()
            });
            pipeline.ingest(&sample, &mut store, &mut sampling, 20);
        }
        let snap = store.snapshot("HeartRate").unwrap();
        assert_eq!(snap.values, vec![72.0, 30.0]);
        assert_eq!(snap.timestamps_ms, vec![1000, 4000]);
    }
    #[test]
    fn baseline_restarts_clock_without_discarding() {
        let mut store = store_for(&SensorSelection::gyroscope_only());
        let mut sampling = SamplingState::new(10.0);
        let pipeline = SamplePipeline::new(30.0, 220.0);
        for i in 0..5 {
            pipeline.ingest(&gyro_sample(i as f64), &mut store, &mut sampling, 20);
        }
        sampling.mark_baseline();
        let report = pipeline.ingest(&gyro_sample(9.0), &mut store, &mut sampling, 20);
        assert_eq!(report.timestamp_ms, 100);
        assert_eq!(store.get("GyroscopeX").unwrap().len(), 6);
    }
}
