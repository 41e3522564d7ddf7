//! Chunked wrapper around a hardware-timed analog input task.

use std::time::SystemTime;

use daqlog_traits::AnalogReader;
use eyre::WrapErr;

use crate::chunk::SampleChunk;
use crate::config::TimingCfg;
use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Produces fixed-size chunks of multi-channel samples at the configured
/// rate. The read buffer is allocated once and reused for every chunk.
///
/// A read timeout is fatal: retries, if any, belong to the caller.
pub struct SampleStream<A: AnalogReader> {
    reader: A,
    timing: TimingCfg,
    chunk: SampleChunk,
    started: bool,
}

impl<A: AnalogReader> SampleStream<A> {
    pub fn new(reader: A, channel_count: usize, timing: TimingCfg) -> Self {
        let chunk = SampleChunk::new(channel_count, timing.chunk);
        Self {
            reader,
            timing,
            chunk,
            started: false,
        }
    }

    pub fn timing(&self) -> &TimingCfg {
        &self.timing
    }

    pub fn channel_count(&self) -> usize {
        self.chunk.channels()
    }

    /// Begin continuous hardware-timed acquisition.
    pub fn start(&mut self) -> Result<()> {
        self.reader
            .start()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("starting analog acquisition")?;
        self.started = true;
        tracing::debug!(
            rate_hz = self.timing.rate_hz,
            chunk = self.timing.chunk,
            channels = self.chunk.channels(),
            buffer_hint = crate::util::suggested_buffer_size(self.timing.rate_hz, self.timing.chunk),
            "analog stream started"
        );
        Ok(())
    }

    /// Block until the next full chunk is available, stamping it with the
    /// wall-clock handover time.
    pub fn next_chunk(&mut self) -> Result<&SampleChunk> {
        let samples = self.timing.chunk;
        let timeout = self.timing.read_timeout;
        self.reader
            .read_into(self.chunk.as_mut_slice(), samples, timeout)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading sample chunk")?;
        self.chunk.set_capture_time(SystemTime::now());
        Ok(&self.chunk)
    }

    /// Stop acquisition (best-effort, idempotent).
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.started = false;
        if let Err(e) = self.reader.stop() {
            tracing::warn!(error = %e, "stopping analog stream failed");
        }
    }
}
