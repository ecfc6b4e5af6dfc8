use std::collections::{BTreeMap, VecDeque};
use log::debug;
/// Independent copy of one channel's history, handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSnapshot {
    pub key: String,
    pub values: Vec<f64>,
    pub timestamps_ms: Vec<i64>,
}
impl ChannelSnapshot {
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn duration_ms(&self) -> i64 {
        match (self.timestamps_ms.first(), self.timestamps_ms.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }
}
/// Bounded history for a single concrete channel.
///
/// Values and timestamps live in two parallel queues that always have the
/// same length; every mutation goes through methods that touch both.
#[derive(Clone, Debug, Default)]
pub struct ChannelBuffer {
    values: VecDeque<f64>,
    timestamps_ms: VecDeque<i64>,
}
impl ChannelBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            timestamps_ms: VecDeque::with_capacity(capacity),
        }
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn push(&mut self, value: f64, timestamp_ms: i64) {
        self.values.push_back(value);
        self.timestamps_ms.push_back(timestamp_ms);
    }
    /// Drops points from the front until at most `max_points` remain.
    pub fn trim_to(&mut self, max_points: usize) -> usize {
        let mut evicted = 0;
        while self.values.len() > max_points {
            self.values.pop_front();
            self.timestamps_ms.pop_front();
            evicted += 1;
        }
        evicted
    }
    pub fn clear(&mut self) {
        self.values.clear();
        self.timestamps_ms.clear();
    }
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
    pub fn timestamps_ms(&self) -> impl Iterator<Item = i64> + '_ {
        self.timestamps_ms.iter().copied()
    }
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.values.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
    pub fn snapshot(&self, key: &str) -> ChannelSnapshot {
        ChannelSnapshot {
            key: key.to_string(),
            values: self.values.iter().copied().collect(),
            timestamps_ms: self.timestamps_ms.iter().copied().collect(),
        }
    }
}
/// Keyed collection of channel buffers, one per available channel.
#[derive(Debug, Default)]
pub struct ChannelStore {
    channels: BTreeMap<String, ChannelBuffer>,
    capacity_hint: usize,
}
impl ChannelStore {
    pub fn new(capacity_hint: usize) -> Self {
        Self {
            channels: BTreeMap::new(),
            capacity_hint,
        }
    }
    /// Makes the set of buffers match `keys`: missing channels are created
    /// empty, channels no longer listed are destroyed, the rest keep their data.
    pub fn sync_channels<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        let wanted: Vec<&str> = keys.into_iter().collect();
        self.channels.retain(|key, _| {
            let keep = wanted.contains(&key.as_str());
            if !keep {
                debug!("destroying buffer for unavailable channel {key}");
            }
            keep
        });
        for key in wanted {
            if !self.channels.contains_key(key) {
                debug!("creating buffer for channel {key}");
                self.channels
                    .insert(key.to_string(), ChannelBuffer::with_capacity(self.capacity_hint));
            }
        }
    }
    pub fn set_capacity_hint(&mut self, capacity_hint: usize) {
        self.capacity_hint = capacity_hint;
    }
    pub fn contains(&self, key: &str) -> bool {
        self.channels.contains_key(key)
    }
    pub fn get(&self, key: &str) -> Option<&ChannelBuffer> {
        self.channels.get(key)
    }
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ChannelBuffer> {
        self.channels.get_mut(key)
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ChannelBuffer)> {
        self.channels.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
    pub fn len(&self) -> usize {
        self.channels.len()
    }
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
    pub fn clear_all(&mut self) {
        for buffer in self.channels.values_mut() {
            buffer.clear();
        }
    }
    pub fn snapshot(&self, key: &str) -> Option<ChannelSnapshot> {
        self.channels.get(key).map(|buffer| buffer.snapshot(key))
    }
}
