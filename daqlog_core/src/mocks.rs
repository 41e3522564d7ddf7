//! Test and helper mocks for daqlog_core.

use daqlog_traits::{BoxError, DigitalReader, DiscreteOutput, Row, RowSink};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Digital reader with no lines; use as the type parameter when a run has no
/// DI configured.
pub struct NoopDigital;

impl DigitalReader for NoopDigital {
    fn read_lines(&mut self, out: &mut Vec<bool>) -> Result<(), BoxError> {
        out.clear();
        Ok(())
    }
}

/// Discrete output that accepts writes and discards them; use as the type
/// parameter when a run has no ignition sequencer attached.
pub struct NoopDiscreteOutput;

impl DiscreteOutput for NoopDiscreteOutput {
    fn write_pair(&mut self, _levels: [bool; 2]) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Captured row for assertions.
#[derive(Debug, Clone)]
pub struct CapturedRow {
    pub timestamp: SystemTime,
    pub index: u64,
    pub analog: Vec<f64>,
    pub digital: Vec<bool>,
}

#[derive(Debug, Default)]
struct MemorySinkState {
    header: Vec<String>,
    rows: Vec<CapturedRow>,
    flushes: usize,
    closed: bool,
    /// When set, `write_row` fails once this many rows have been accepted.
    fail_after: Option<usize>,
}

/// In-memory row sink for tests. Clones share state, so a test can keep a
/// handle while the acquisition loop owns the sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemorySinkState>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `write_row` after accepting `n` rows.
    pub fn failing_after(n: usize) -> Self {
        let sink = Self::default();
        if let Ok(mut s) = sink.state.lock() {
            s.fail_after = Some(n);
        }
        sink
    }

    pub fn header(&self) -> Vec<String> {
        self.state.lock().map(|s| s.header.clone()).unwrap_or_default()
    }

    pub fn rows(&self) -> Vec<CapturedRow> {
        self.state.lock().map(|s| s.rows.clone()).unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.state.lock().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn flushes(&self) -> usize {
        self.state.lock().map(|s| s.flushes).unwrap_or(0)
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().map(|s| s.closed).unwrap_or(false)
    }
}

impl RowSink for MemorySink {
    fn write_header(&mut self, columns: &[String]) -> Result<(), BoxError> {
        let mut s = self.state.lock().map_err(|_| -> BoxError { "poisoned".into() })?;
        s.header = columns.to_vec();
        Ok(())
    }

    fn write_row(&mut self, row: &Row<'_>) -> Result<(), BoxError> {
        let mut s = self.state.lock().map_err(|_| -> BoxError { "poisoned".into() })?;
        if let Some(limit) = s.fail_after
            && s.rows.len() >= limit
        {
            return Err("sink full".into());
        }
        s.rows.push(CapturedRow {
            timestamp: row.timestamp,
            index: row.index,
            analog: row.analog.to_vec(),
            digital: row.digital.to_vec(),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BoxError> {
        let mut s = self.state.lock().map_err(|_| -> BoxError { "poisoned".into() })?;
        s.flushes += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BoxError> {
        let mut s = self.state.lock().map_err(|_| -> BoxError { "poisoned".into() })?;
        s.closed = true;
        Ok(())
    }
}
