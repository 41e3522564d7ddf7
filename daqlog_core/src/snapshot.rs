//! Per-chunk snapshots of static digital input lines.

use daqlog_traits::DigitalReader;
use eyre::WrapErr;

use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Wraps the DI lines and produces one boolean snapshot per acquisition
/// chunk. DI has no hardware timing, so the acquisition loop calls
/// `snapshot` exactly once per chunk and replicates the values across every
/// row of that chunk; the effective DI sampling cadence is therefore
/// `rate / chunk` Hz.
pub struct DigitalSnapshotSource<D: DigitalReader> {
    reader: D,
    line_count: usize,
    buf: Vec<bool>,
}

impl<D: DigitalReader> DigitalSnapshotSource<D> {
    pub fn new(reader: D, line_count: usize) -> Self {
        Self {
            reader,
            line_count,
            buf: Vec::with_capacity(line_count),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Read the current level of every line, boolean-coerced.
    pub fn snapshot(&mut self) -> Result<&[bool]> {
        self.reader
            .read_lines(&mut self.buf)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading digital snapshot")?;
        if self.buf.len() != self.line_count {
            eyre::bail!(
                "digital read returned {} lines, expected {}",
                self.buf.len(),
                self.line_count
            );
        }
        Ok(&self.buf)
    }
}
