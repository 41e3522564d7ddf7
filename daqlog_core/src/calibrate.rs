//! Calibration mode: a slow streaming run that reports windowed moving
//! averages per channel instead of raw samples. Runs until cancelled.

use std::sync::Arc;
use std::time::Duration;

use daqlog_traits::{AnalogReader, Clock, DigitalReader, Row, RowSink};
use eyre::WrapErr;

use crate::acquisition::RunSummary;
use crate::cancel::CancelToken;
use crate::config::CalibrationTiming;
use crate::error::{DaqError, Result, StopReason};
use crate::filter::CalibrationFilter;
use crate::snapshot::DigitalSnapshotSource;
use crate::stream::SampleStream;

/// Header for calibration output: averaged channels, optionally followed by
/// the raw instantaneous values, then DI lines.
pub fn calibration_columns(
    channel_names: &[String],
    show_raw: bool,
    digital_names: &[String],
) -> Vec<String> {
    let mut cols = Vec::with_capacity(2 + 2 * channel_names.len() + digital_names.len());
    cols.push("timestamp_iso".to_string());
    cols.push("sample_index".to_string());
    cols.extend(channel_names.iter().map(|c| format!("{c}_avg")));
    if show_raw {
        cols.extend(channel_names.iter().map(|c| format!("{c}_raw")));
    }
    cols.extend(digital_names.iter().cloned());
    cols
}

pub struct CalibrationRun<A, D, R>
where
    A: AnalogReader,
    D: DigitalReader,
    R: RowSink,
{
    stream: SampleStream<A>,
    digital: Option<DigitalSnapshotSource<D>>,
    filter: CalibrationFilter,
    sink: R,
    cancel: CancelToken,
    clock: Arc<dyn Clock + Send + Sync>,
    timing: CalibrationTiming,
    columns: Vec<String>,
}

impl<A, D, R> CalibrationRun<A, D, R>
where
    A: AnalogReader,
    D: DigitalReader,
    R: RowSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stream: SampleStream<A>,
        digital: Option<DigitalSnapshotSource<D>>,
        sink: R,
        cancel: CancelToken,
        clock: Arc<dyn Clock + Send + Sync>,
        timing: CalibrationTiming,
        columns: Vec<String>,
    ) -> Self {
        let filter = CalibrationFilter::new(
            stream.channel_count(),
            timing.window,
            timing.sample_rate_hz,
        );
        Self {
            stream,
            digital,
            filter,
            sink,
            cancel,
            clock,
            timing,
            columns,
        }
    }

    pub fn run(mut self) -> Result<RunSummary> {
        let result = self.run_inner();
        self.shutdown();
        result
    }

    fn run_inner(&mut self) -> Result<RunSummary> {
        self.sink
            .write_header(&self.columns)
            .map_err(|e| eyre::Report::new(DaqError::Sink(e.to_string())))
            .wrap_err("writing header")?;

        self.stream.start()?;
        let t0 = self.clock.now();
        let output_interval = Duration::from_secs_f64(1.0 / self.timing.output_rate_hz);
        let mut next_emit = t0;
        let mut emitted: u64 = 0;
        let channels = self.stream.channel_count();
        let mut row_buf: Vec<f64> = Vec::new();

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(emitted, "calibration stopped");
                return Ok(RunSummary {
                    rows: emitted,
                    elapsed: self.clock.elapsed_since(t0),
                    reason: StopReason::Cancelled,
                });
            }

            let chunk = self.stream.next_chunk()?;
            let di: &[bool] = match self.digital.as_mut() {
                Some(d) => d.snapshot()?,
                None => &[],
            };

            for i in 0..chunk.samples_per_channel() {
                for ch in 0..channels {
                    self.filter.push(ch, chunk.sample(ch, i));
                }
            }

            let now = self.clock.now();
            if now >= next_emit {
                row_buf.clear();
                for ch in 0..channels {
                    row_buf.push(self.filter.average(ch));
                }
                if self.timing.show_raw {
                    let last = chunk.samples_per_channel() - 1;
                    for ch in 0..channels {
                        row_buf.push(chunk.sample(ch, last));
                    }
                }
                let row = Row {
                    timestamp: chunk.capture_time(),
                    index: emitted,
                    analog: &row_buf,
                    digital: di,
                };
                self.sink
                    .write_row(&row)
                    .map_err(|e| eyre::Report::new(DaqError::Sink(e.to_string())))
                    .wrap_err("writing calibration row")?;
                self.sink
                    .flush()
                    .map_err(|e| eyre::Report::new(DaqError::Sink(e.to_string())))
                    .wrap_err("flushing calibration row")?;
                emitted += 1;
                next_emit = now + output_interval;
            }
        }
    }

    fn shutdown(&mut self) {
        self.stream.stop();
        if let Err(e) = self.sink.flush() {
            tracing::warn!(error = %e, "final sink flush failed");
        }
        if let Err(e) = self.sink.close() {
            tracing::warn!(error = %e, "closing sink failed");
        }
    }
}
