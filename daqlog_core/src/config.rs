//! Runtime configuration types for the acquisition engine.
//!
//! These are the validated, immutable structs the core components consume.
//! They are separate from the TOML-deserialized schema in `daqlog_config`;
//! see `conversions` for the mapping.

use std::time::Duration;

/// Analog input wiring reference mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminal {
    #[default]
    Rse,
    Nrse,
    Diff,
}

/// Ordered analog channel set with its voltage range and terminal mode.
/// Immutable once acquisition starts; channel order defines column order.
#[derive(Debug, Clone)]
pub struct ChannelCfg {
    pub channels: Vec<String>,
    pub vmin: f64,
    pub vmax: f64,
    pub terminal: Terminal,
}

impl ChannelCfg {
    pub fn count(&self) -> usize {
        self.channels.len()
    }
}

/// Sample clock and chunking parameters.
#[derive(Debug, Clone)]
pub struct TimingCfg {
    /// Hardware sample rate in Hz per channel.
    pub rate_hz: f64,
    /// Samples per read per channel; also the DI snapshot cadence divisor
    /// (effective DI rate is `rate_hz / chunk` Hz).
    pub chunk: usize,
    /// Per-read timeout; a miss is fatal to the run.
    pub read_timeout: Duration,
}

impl TimingCfg {
    pub fn new(rate_hz: f64, chunk: usize) -> Self {
        Self {
            rate_hz,
            chunk,
            read_timeout: crate::util::default_read_timeout(rate_hz, chunk),
        }
    }

    pub fn chunk_duration(&self) -> Duration {
        crate::util::chunk_duration(self.rate_hz, self.chunk)
    }
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self::new(1000.0, 1000)
    }
}

/// Deadlines for the two-stage safety actuation sequence.
#[derive(Debug, Clone)]
pub struct IgnitionTiming {
    /// Buzzer pre-warning length before acquisition starts.
    pub arm: Duration,
    /// Settling delay between acquisition start and firing.
    pub stabilize: Duration,
    /// Relay ON time.
    pub pulse: Duration,
}

impl Default for IgnitionTiming {
    fn default() -> Self {
        Self {
            arm: Duration::from_secs(15),
            stabilize: Duration::from_secs(1),
            pulse: Duration::from_secs(1),
        }
    }
}

/// Parameters for the live calibration readout.
#[derive(Debug, Clone)]
pub struct CalibrationTiming {
    /// Moving-average window; zero degenerates to a window of one sample.
    pub window: Duration,
    /// Internal hardware sampling rate feeding the filter.
    pub sample_rate_hz: f64,
    /// Display emit rate, independent of the feed rate.
    pub output_rate_hz: f64,
    /// Also emit raw instantaneous values next to the averages.
    pub show_raw: bool,
}

impl Default for CalibrationTiming {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(5),
            sample_rate_hz: 100.0,
            output_rate_hz: 1.0,
            show_raw: false,
        }
    }
}
