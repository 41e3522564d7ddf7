//! Simulated reference devices for the DAQ logger.
//!
//! The real NI-DAQmx driver lives behind the `daqlog_traits` seams and is
//! supplied by the embedding application; this crate provides software
//! stand-ins with the same timing behavior (hardware-paced chunk reads,
//! static DI snapshots, atomic two-line DO writes) so the full stack can run
//! and be tested without a device attached.

pub mod error;

pub use error::HwError;

use daqlog_traits::{AnalogReader, BoxError, DigitalReader, DiscreteOutput};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Hardware-paced analog source producing a per-channel sine plus DC offset.
///
/// `read_into` blocks until one chunk's worth of wall-clock time has elapsed
/// since the previous chunk became available, mimicking a driver-side
/// circular buffer fed by a hardware sample clock.
pub struct SimulatedAnalog {
    channels: usize,
    rate_hz: f64,
    sample_index: u64,
    next_ready: Option<Instant>,
    started: bool,
}

impl SimulatedAnalog {
    pub fn new(channels: usize, rate_hz: f64) -> Self {
        Self {
            channels,
            rate_hz,
            sample_index: 0,
            next_ready: None,
            started: false,
        }
    }

    fn sample(&self, channel: usize, index: u64) -> f64 {
        // 10 Hz sine, 1 V amplitude, per-channel DC offset for telling
        // columns apart in captured files.
        let t = index as f64 / self.rate_hz;
        (2.0 * std::f64::consts::PI * 10.0 * t).sin() + channel as f64 * 0.5
    }
}

impl AnalogReader for SimulatedAnalog {
    fn start(&mut self) -> Result<(), BoxError> {
        if self.rate_hz <= 0.0 || self.channels == 0 {
            return Err(Box::new(HwError::Config(
                "simulated analog needs channels and a positive rate".into(),
            )));
        }
        self.started = true;
        self.next_ready = Some(Instant::now());
        tracing::debug!(
            channels = self.channels,
            rate_hz = self.rate_hz,
            "simulated AI started"
        );
        Ok(())
    }

    fn read_into(
        &mut self,
        buf: &mut [f64],
        samples_per_channel: usize,
        timeout: Duration,
    ) -> Result<(), BoxError> {
        if !self.started {
            return Err(Box::new(HwError::Config("AI task not started".into())));
        }
        if buf.len() != self.channels * samples_per_channel {
            return Err(Box::new(HwError::Config(format!(
                "buffer holds {} values, expected {}",
                buf.len(),
                self.channels * samples_per_channel
            ))));
        }

        let chunk_dur = Duration::from_secs_f64(samples_per_channel as f64 / self.rate_hz);
        let ready_at = self.next_ready.unwrap_or_else(Instant::now) + chunk_dur;
        let now = Instant::now();
        if ready_at > now {
            let wait = ready_at - now;
            if wait > timeout {
                std::thread::sleep(timeout);
                return Err(Box::new(HwError::ReadTimeout));
            }
            std::thread::sleep(wait);
        }
        self.next_ready = Some(ready_at);

        for ch in 0..self.channels {
            for i in 0..samples_per_channel {
                buf[ch * samples_per_channel + i] = self.sample(ch, self.sample_index + i as u64);
            }
        }
        self.sample_index += samples_per_channel as u64;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        if self.started {
            tracing::debug!("simulated AI stopped");
        }
        self.started = false;
        self.next_ready = None;
        Ok(())
    }
}

/// Static digital lines with a deterministic toggling pattern: line `i`
/// flips every `2^i` snapshots.
pub struct SimulatedDigital {
    lines: usize,
    ticks: u64,
}

impl SimulatedDigital {
    pub fn new(lines: usize) -> Self {
        Self { lines, ticks: 0 }
    }
}

impl DigitalReader for SimulatedDigital {
    fn read_lines(&mut self, out: &mut Vec<bool>) -> Result<(), BoxError> {
        out.clear();
        for i in 0..self.lines {
            out.push((self.ticks >> i) & 1 != 0);
        }
        self.ticks += 1;
        Ok(())
    }
}

/// Discrete output pair that records every write, for operator-visible
/// logging and for asserting the safety invariant in tests.
#[derive(Clone, Default)]
pub struct SimulatedDiscreteOutput {
    state: Arc<Mutex<OutputState>>,
}

#[derive(Debug, Default)]
struct OutputState {
    levels: [bool; 2],
    history: Vec<[bool; 2]>,
}

impl SimulatedDiscreteOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current `[buzzer, igniter]` levels.
    pub fn levels(&self) -> [bool; 2] {
        self.state.lock().map(|s| s.levels).unwrap_or_default()
    }

    /// Every write observed so far, oldest first.
    pub fn history(&self) -> Vec<[bool; 2]> {
        self.state
            .lock()
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }
}

impl DiscreteOutput for SimulatedDiscreteOutput {
    fn write_pair(&mut self, levels: [bool; 2]) -> Result<(), BoxError> {
        let mut s = self.state.lock().map_err(|_| -> BoxError {
            Box::new(HwError::DigitalWrite("output state poisoned".into()))
        })?;
        s.levels = levels;
        s.history.push(levels);
        tracing::debug!(buzzer = levels[0], igniter = levels[1], "DO write");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_digital_toggles_line0_every_snapshot() {
        let mut di = SimulatedDigital::new(2);
        let mut out = Vec::new();
        di.read_lines(&mut out).unwrap();
        assert_eq!(out, [false, false]);
        di.read_lines(&mut out).unwrap();
        assert_eq!(out, [true, false]);
        di.read_lines(&mut out).unwrap();
        assert_eq!(out, [false, true]);
    }

    #[test]
    fn discrete_output_records_history() {
        let mut out = SimulatedDiscreteOutput::new();
        out.write_pair([false, false]).unwrap();
        out.write_pair([true, false]).unwrap();
        assert_eq!(out.levels(), [true, false]);
        assert_eq!(out.history(), vec![[false, false], [true, false]]);
    }

    #[test]
    fn analog_read_requires_start() {
        let mut ai = SimulatedAnalog::new(1, 100.0);
        let mut buf = vec![0.0; 10];
        assert!(
            ai.read_into(&mut buf, 10, Duration::from_millis(10))
                .is_err()
        );
    }
}
