//! Per-channel sliding-window moving average for the live calibration
//! readout.
//!
//! The filter is fed every hardware sample but only read at the (much
//! slower) display cadence, decoupling the internal feed rate from the
//! output rate.

use std::collections::VecDeque;
use std::time::Duration;

pub struct CalibrationFilter {
    hist: Vec<VecDeque<f64>>,
    capacity: usize,
}

impl CalibrationFilter {
    pub fn new(channels: usize, window: Duration, sample_rate_hz: f64) -> Self {
        let capacity = window_samples(window, sample_rate_hz);
        Self {
            hist: (0..channels)
                .map(|_| VecDeque::with_capacity(capacity))
                .collect(),
            capacity,
        }
    }

    /// Window size in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one sample, evicting the oldest when the window is full.
    pub fn push(&mut self, channel: usize, value: f64) {
        let h = &mut self.hist[channel];
        if h.len() == self.capacity {
            h.pop_front();
        }
        h.push_back(value);
    }

    /// Arithmetic mean of the buffered samples; 0.0 when empty.
    pub fn average(&self, channel: usize) -> f64 {
        let h = &self.hist[channel];
        if h.is_empty() {
            return 0.0;
        }
        h.iter().sum::<f64>() / h.len() as f64
    }
}

/// Window capacity in samples: `round(window_seconds * rate)`, minimum 1.
/// A zero-length window degenerates to size 1 (pass-through).
pub fn window_samples(window: Duration, sample_rate_hz: f64) -> usize {
    let secs = window.as_secs_f64();
    if secs <= 0.0 {
        return 1;
    }
    ((secs * sample_rate_hz).round() as usize).max(1)
}
