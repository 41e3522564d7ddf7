pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::{Duration, SystemTime};

/// Boxed error type used at all trait boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Hardware-timed analog input stream.
///
/// Implementations own the underlying acquisition task. `read_into` fills a
/// channel-major buffer (`samples_per_channel` values per channel, channels
/// in configuration order) and blocks until a full chunk is available or
/// `timeout` expires. Partial chunks are never returned.
pub trait AnalogReader {
    /// Begin continuous acquisition.
    fn start(&mut self) -> Result<(), BoxError>;

    /// Read exactly one chunk into `buf` (length = channels * samples_per_channel).
    fn read_into(
        &mut self,
        buf: &mut [f64],
        samples_per_channel: usize,
        timeout: Duration,
    ) -> Result<(), BoxError>;

    /// Stop acquisition. Idempotent.
    fn stop(&mut self) -> Result<(), BoxError>;
}

/// Static (software-timed) digital input lines.
pub trait DigitalReader {
    /// Read the current level of every configured line, in configuration order.
    fn read_lines(&mut self, out: &mut Vec<bool>) -> Result<(), BoxError>;
}

/// Two-line discrete output pair, fixed order `[buzzer, igniter]`.
///
/// Writes are atomic over both lines so the hardware never observes an
/// inconsistent intermediate combination.
pub trait DiscreteOutput {
    fn write_pair(&mut self, levels: [bool; 2]) -> Result<(), BoxError>;
}

/// One emitted data row: wall-clock timestamp, running per-channel sample
/// index, analog voltages in channel order, digital snapshot in line order.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub timestamp: SystemTime,
    pub index: u64,
    pub analog: &'a [f64],
    pub digital: &'a [bool],
}

/// Append-only row consumer (CSV file, console, test capture).
///
/// The acquisition loop never reads rows back; any type providing these four
/// capabilities is acceptable.
pub trait RowSink {
    fn write_header(&mut self, columns: &[String]) -> Result<(), BoxError>;
    fn write_row(&mut self, row: &Row<'_>) -> Result<(), BoxError>;
    fn flush(&mut self) -> Result<(), BoxError>;
    fn close(&mut self) -> Result<(), BoxError>;
}

impl<S: RowSink + ?Sized> RowSink for Box<S> {
    fn write_header(&mut self, columns: &[String]) -> Result<(), BoxError> {
        (**self).write_header(columns)
    }
    fn write_row(&mut self, row: &Row<'_>) -> Result<(), BoxError> {
        (**self).write_row(row)
    }
    fn flush(&mut self) -> Result<(), BoxError> {
        (**self).flush()
    }
    fn close(&mut self) -> Result<(), BoxError> {
        (**self).close()
    }
}

/// Numeric progress updates computed by the core; rendering is the sink's job.
#[derive(Debug, Clone, Copy)]
pub enum ProgressUpdate {
    /// Free-running counter mode.
    Counter {
        elapsed: Duration,
        samples_per_channel: u64,
        channel_count: usize,
        /// Instantaneous per-channel sample rate over the last update interval.
        instantaneous_rate: f64,
    },
    /// Bounded-run bar mode.
    Bar {
        elapsed: Duration,
        duration: Duration,
    },
    /// Pre-run arming countdown.
    Arming { remaining: Duration },
}

pub trait ProgressSink {
    fn update(&mut self, update: ProgressUpdate);
    /// Called once when the run ends, on every exit path.
    fn finish(&mut self);
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn update(&mut self, update: ProgressUpdate) {
        (**self).update(update)
    }
    fn finish(&mut self) {
        (**self).finish()
    }
}

/// Progress sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn update(&mut self, _update: ProgressUpdate) {}
    fn finish(&mut self) {}
}
