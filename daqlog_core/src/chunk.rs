//! Fixed-size multi-channel sample buffer for one hardware read.

use std::time::SystemTime;

/// One hardware-timed block of samples, channel-major: all samples for
/// channel 0, then channel 1, and so on.
#[derive(Debug, Clone)]
pub struct SampleChunk {
    data: Vec<f64>,
    channels: usize,
    samples_per_channel: usize,
    capture_time: SystemTime,
}

impl SampleChunk {
    pub fn new(channels: usize, samples_per_channel: usize) -> Self {
        Self {
            data: vec![0.0; channels * samples_per_channel],
            channels,
            samples_per_channel,
            capture_time: SystemTime::UNIX_EPOCH,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples_per_channel(&self) -> usize {
        self.samples_per_channel
    }

    /// Wall-clock time at which this chunk was handed over by the driver.
    /// Row timestamps are derived from it by sample index.
    pub fn capture_time(&self) -> SystemTime {
        self.capture_time
    }

    pub(crate) fn set_capture_time(&mut self, t: SystemTime) {
        self.capture_time = t;
    }

    /// All samples of one channel, in acquisition order.
    pub fn channel(&self, ch: usize) -> &[f64] {
        let start = ch * self.samples_per_channel;
        &self.data[start..start + self.samples_per_channel]
    }

    #[inline]
    pub fn sample(&self, ch: usize, i: usize) -> f64 {
        self.data[ch * self.samples_per_channel + i]
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_channel_major() {
        let mut c = SampleChunk::new(2, 3);
        c.as_mut_slice().copy_from_slice(&[1.0, 2.0, 3.0, 10.0, 20.0, 30.0]);
        assert_eq!(c.channel(0), &[1.0, 2.0, 3.0]);
        assert_eq!(c.channel(1), &[10.0, 20.0, 30.0]);
        assert_eq!(c.sample(1, 2), 30.0);
    }
}
