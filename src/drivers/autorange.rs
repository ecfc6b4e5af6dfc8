use crate::drivers::buffer::ChannelBuffer;
/// Vertical axis bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}
impl AxisRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}
const MARGIN_FRACTION: f64 = 0.1;
/// Computes Y bounds over every value of every given buffer, with a 10%
/// margin on each side. Flat data gets a margin proportional to its level so
/// the axis never collapses. Empty input falls back to `fallback`.
pub fn compute_auto_range<'a>(
    buffers: impl IntoIterator<Item = &'a ChannelBuffer>,
    fallback: AxisRange,
) -> AxisRange {
    let extremes = buffers
        .into_iter()
        .filter_map(ChannelBuffer::min_max)
        .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)));
    let Some((min, max)) = extremes else {
        return fallback;
    };
    let (lower, upper) = if max > min {
        let margin = (max - min) * MARGIN_FRACTION;
        (min - margin, max + margin)
    } else {
        let center = min;
        let margin = MARGIN_FRACTION * center.abs() + MARGIN_FRACTION;
        (center - margin, center + margin)
    };
    AxisRange::new(round3(lower), round3(upper))
}
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
#[cfg(test)]
mod tests {
    use super::*;
    fn buffer_of(values: &[f64]) -> ChannelBuffer {
        let mut buffer = ChannelBuffer::default();
        for (i, v) in values.iter().enumerate() {
            buffer.push(*v, i as i64 * 20);
        }
        buffer
    }
    #[test]
    fn triad_range_includes_ten_percent_margin() {
        let x = buffer_of(&[-5.0, -2.0, 1.0]);
        let y = buffer_of(&[0.0, 10.0, 12.0]);
        let z = buffer_of(&[3.0, 4.0, 6.0]);
        let range = compute_auto_range([&x, &y, &z], AxisRange::new(-250.0, 250.0));
        assert_eq!(range, AxisRange::new(-6.7, 13.7));
    }
    #[test]
    fn flat_data_gets_level_proportional_margin() {
        let flat = buffer_of(&[4.0, 4.0, 4.0]);
        let range = compute_auto_range([&flat], AxisRange::new(0.0, 1.0));
        assert_eq!(range, AxisRange::new(3.5, 4.5));
        let zero = buffer_of(&[0.0]);
        assert_eq!(
            compute_auto_range([&zero], AxisRange::new(0.0, 1.0)),
            AxisRange::new(-0.1, 0.1)
        );
    }
    #[test]
    fn empty_buffers_fall_back_to_defaults() {
        let a = ChannelBuffer::default();
        let b = ChannelBuffer::default();
        let fallback = AxisRange::new(-20.0, 20.0);
        assert_eq!(compute_auto_range([&a, &b], fallback), fallback);
    }
    #[test]
    fn partially_empty_group_uses_available_data() {
        let a = ChannelBuffer::default();
        let b = buffer_of(&[1.0, 2.0]);
        let range = compute_auto_range([&a, &b], AxisRange::new(-20.0, 20.0));
        assert_eq!(range, AxisRange::new(0.9, 2.1));
    }
}
