//! The main acquisition loop.
//!
//! Drives one cycle per chunk: poll cancellation, poll the actuation
//! sequencer, block on the analog stream, snapshot DI once, emit rows,
//! advance counters, report progress at a fixed wall-clock cadence. On
//! every exit path (normal, cancelled, or errored) the loop forces the
//! actuation outputs low, stops the stream, and closes the sink; this
//! release-on-all-exit-paths guarantee is the component's most important
//! contract.

use std::sync::Arc;
use std::time::Duration;

use daqlog_traits::{
    AnalogReader, BoxError, Clock, DigitalReader, DiscreteOutput, ProgressSink, ProgressUpdate,
    Row, RowSink,
};
use eyre::WrapErr;

use crate::cancel::CancelToken;
use crate::error::{DaqError, Result, StopReason};
use crate::sequencer::{ActuationSequencer, ActuationState, SequencerTick};
use crate::snapshot::DigitalSnapshotSource;
use crate::stream::SampleStream;

/// Column names for the row sink header: timestamp, running sample index,
/// analog channels in configuration order, then DI lines.
pub fn header_columns(channel_names: &[String], digital_names: &[String]) -> Vec<String> {
    let mut cols = Vec::with_capacity(2 + channel_names.len() + digital_names.len());
    cols.push("timestamp_iso".to_string());
    cols.push("sample_index".to_string());
    cols.extend(channel_names.iter().cloned());
    cols.extend(digital_names.iter().cloned());
    cols
}

#[derive(Debug, Clone)]
pub struct RunParams {
    /// Full header, as built by `header_columns`.
    pub columns: Vec<String>,
    /// Stop after this much acquisition time; `None` runs until cancelled.
    pub duration: Option<Duration>,
    /// Wall-clock cadence for progress updates, independent of chunks.
    pub update_interval: Duration,
    /// Wall-clock cadence for sink flushes.
    pub flush_interval: Duration,
    /// Emit bar-style progress (needs `duration`) instead of a counter.
    pub bar_progress: bool,
    /// Poll period of the pre-acquisition arming wait.
    pub arming_poll: Duration,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            duration: None,
            update_interval: Duration::from_millis(500),
            flush_interval: Duration::from_secs(5),
            bar_progress: false,
            arming_poll: Duration::from_millis(100),
        }
    }
}

/// How a finished run went.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Rows emitted per analog channel.
    pub rows: u64,
    pub elapsed: Duration,
    pub reason: StopReason,
}

pub struct AcquisitionLoop<A, D, W, R, P>
where
    A: AnalogReader,
    D: DigitalReader,
    W: DiscreteOutput,
    R: RowSink,
    P: ProgressSink,
{
    stream: SampleStream<A>,
    digital: Option<DigitalSnapshotSource<D>>,
    sequencer: Option<ActuationSequencer<W>>,
    sink: R,
    progress: P,
    cancel: CancelToken,
    clock: Arc<dyn Clock + Send + Sync>,
    params: RunParams,
}

impl<A, D, W, R, P> AcquisitionLoop<A, D, W, R, P>
where
    A: AnalogReader,
    D: DigitalReader,
    W: DiscreteOutput,
    R: RowSink,
    P: ProgressSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stream: SampleStream<A>,
        digital: Option<DigitalSnapshotSource<D>>,
        sequencer: Option<ActuationSequencer<W>>,
        sink: R,
        progress: P,
        cancel: CancelToken,
        clock: Arc<dyn Clock + Send + Sync>,
        params: RunParams,
    ) -> Self {
        Self {
            stream,
            digital,
            sequencer,
            sink,
            progress,
            cancel,
            clock,
            params,
        }
    }

    /// Run to completion. Cleanup (actuation outputs low, stream stopped,
    /// sink closed) happens on every exit path, success or error.
    pub fn run(mut self) -> Result<RunSummary> {
        let result = self.run_inner();
        self.shutdown();
        result
    }

    fn run_inner(&mut self) -> Result<RunSummary> {
        if !self.wait_for_arming()? {
            tracing::warn!("arming aborted; acquisition never started");
            return Ok(RunSummary {
                rows: 0,
                elapsed: Duration::ZERO,
                reason: StopReason::ArmingAborted,
            });
        }

        self.sink
            .write_header(&self.params.columns)
            .map_err(sink_err)
            .wrap_err("writing header")?;

        self.stream.start()?;
        let t0 = self.clock.now();
        if let Some(seq) = self.sequencer.as_mut() {
            seq.mark_acquisition_start(t0);
        }

        let rate = self.stream.timing().rate_hz;
        let mut rows_total: u64 = 0;
        let mut last_update = t0;
        let mut last_rows: u64 = 0;
        let mut next_update = t0 + self.params.update_interval;
        let mut next_flush = t0 + self.params.flush_interval;
        let mut row_buf: Vec<f64> = Vec::new();

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(rows_total, "cancellation observed, stopping");
                return Ok(RunSummary {
                    rows: rows_total,
                    elapsed: self.clock.elapsed_since(t0),
                    reason: StopReason::Cancelled,
                });
            }

            // At most one actuation transition per iteration; the firing
            // window is bounded even while the run is winding down because
            // shutdown() forces outputs low unconditionally.
            if let Some(seq) = self.sequencer.as_mut() {
                seq.poll().wrap_err("actuation sequencing")?;
            }

            let chunk = self.stream.next_chunk()?;
            let di: &[bool] = match self.digital.as_mut() {
                Some(d) => d.snapshot()?,
                None => &[],
            };

            row_buf.resize(chunk.channels(), 0.0);
            let capture = chunk.capture_time();
            for i in 0..chunk.samples_per_channel() {
                for (ch, slot) in row_buf.iter_mut().enumerate() {
                    *slot = chunk.sample(ch, i);
                }
                let row = Row {
                    timestamp: capture + Duration::from_secs_f64(i as f64 / rate),
                    index: rows_total + i as u64,
                    analog: &row_buf,
                    digital: di,
                };
                self.sink
                    .write_row(&row)
                    .map_err(sink_err)
                    .wrap_err("writing row")?;
            }
            rows_total += chunk.samples_per_channel() as u64;

            let now = self.clock.now();
            if now >= next_flush {
                self.sink.flush().map_err(sink_err).wrap_err("flushing sink")?;
                next_flush = now + self.params.flush_interval;
            }

            if let Some(duration) = self.params.duration
                && now.saturating_duration_since(t0) >= duration
            {
                tracing::info!(rows_total, "configured duration elapsed");
                return Ok(RunSummary {
                    rows: rows_total,
                    elapsed: self.clock.elapsed_since(t0),
                    reason: StopReason::DurationElapsed,
                });
            }

            if now >= next_update {
                let elapsed = now.saturating_duration_since(t0);
                let update = if self.params.bar_progress
                    && let Some(duration) = self.params.duration
                {
                    ProgressUpdate::Bar { elapsed, duration }
                } else {
                    let dt = now.saturating_duration_since(last_update).as_secs_f64();
                    let inst = if dt > 0.0 {
                        (rows_total - last_rows) as f64 / dt
                    } else {
                        0.0
                    };
                    ProgressUpdate::Counter {
                        elapsed,
                        samples_per_channel: rows_total,
                        channel_count: row_buf.len(),
                        instantaneous_rate: inst,
                    }
                };
                self.progress.update(update);
                last_update = now;
                last_rows = rows_total;
                next_update = now + self.params.update_interval;
            }
        }
    }

    /// Drive the pre-acquisition arming countdown. Returns `false` when
    /// cancellation arrived during arming; the stream must not be started
    /// in that case.
    fn wait_for_arming(&mut self) -> Result<bool> {
        let Some(seq) = self.sequencer.as_mut() else {
            return Ok(true);
        };
        if seq.state() != ActuationState::Idle {
            return Ok(true);
        }
        seq.arm()?;
        loop {
            if self.cancel.is_cancelled() {
                seq.abort();
                return Ok(false);
            }
            if seq.poll().wrap_err("actuation sequencing during arming")? == SequencerTick::ArmingDone
            {
                return Ok(true);
            }
            if let Some(remaining) = seq.arming_remaining() {
                self.progress.update(ProgressUpdate::Arming { remaining });
            }
            self.clock.sleep(self.params.arming_poll);
        }
    }

    /// Unconditional cleanup: actuation outputs low first, then the
    /// hardware handles, then the sink.
    fn shutdown(&mut self) {
        if let Some(seq) = self.sequencer.as_mut() {
            seq.abort();
        }
        self.stream.stop();
        if let Err(e) = self.sink.flush() {
            tracing::warn!(error = %e, "final sink flush failed");
        }
        if let Err(e) = self.sink.close() {
            tracing::warn!(error = %e, "closing sink failed");
        }
        self.progress.finish();
    }
}

fn sink_err(e: BoxError) -> eyre::Report {
    eyre::Report::new(DaqError::Sink(e.to_string()))
}
