//! Row sinks: CSV file writer, console writer for calibration, and the
//! first-N-rows preview decorator. Also output path inference.

use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use daqlog_traits::{BoxError, Row, RowSink};
use eyre::WrapErr;

fn iso_timestamp(t: SystemTime) -> String {
    DateTime::<Local>::from(t)
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// CSV file sink. One record per row: ISO timestamp, sample index, analog
/// voltages, then digital levels as 0/1.
pub struct CsvRowSink {
    writer: csv::Writer<File>,
    record: Vec<String>,
}

impl CsvRowSink {
    pub fn create(path: &Path) -> eyre::Result<Self> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .wrap_err_with(|| format!("creating output directory {}", dir.display()))?;
        }
        let writer = csv::Writer::from_path(path)
            .wrap_err_with(|| format!("creating output file {}", path.display()))?;
        Ok(Self {
            writer,
            record: Vec::new(),
        })
    }
}

impl RowSink for CsvRowSink {
    fn write_header(&mut self, columns: &[String]) -> Result<(), BoxError> {
        self.writer.write_record(columns)?;
        Ok(())
    }

    fn write_row(&mut self, row: &Row<'_>) -> Result<(), BoxError> {
        self.record.clear();
        self.record.push(iso_timestamp(row.timestamp));
        self.record.push(row.index.to_string());
        for v in row.analog {
            self.record.push(format!("{v:.6}"));
        }
        for d in row.digital {
            self.record.push(if *d { "1" } else { "0" }.to_string());
        }
        self.writer.write_record(&self.record)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BoxError> {
        self.writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BoxError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Console sink for calibration mode: one line per emitted row with labeled
/// values instead of CSV.
#[derive(Default)]
pub struct ConsoleSink {
    columns: Vec<String>,
}

impl RowSink for ConsoleSink {
    fn write_header(&mut self, columns: &[String]) -> Result<(), BoxError> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn write_row(&mut self, row: &Row<'_>) -> Result<(), BoxError> {
        let mut line = iso_timestamp(row.timestamp);
        // Columns 0 and 1 are the timestamp and index.
        let names = self.columns.iter().skip(2);
        let values = row
            .analog
            .iter()
            .map(|v| format!("{v:+.4}"))
            .chain(row.digital.iter().map(|d| if *d { "1" } else { "0" }.to_string()));
        for (name, value) in names.zip(values) {
            line.push_str(&format!("  {name}={value}"));
        }
        println!("{line}");
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BoxError> {
        std::io::stdout().flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Echoes the first N rows to the console, then stays out of the way.
pub struct PreviewSink<S: RowSink> {
    inner: S,
    remaining: usize,
    columns: Vec<String>,
}

impl<S: RowSink> PreviewSink<S> {
    pub fn new(inner: S, rows: usize) -> Self {
        Self {
            inner,
            remaining: rows,
            columns: Vec::new(),
        }
    }
}

impl<S: RowSink> RowSink for PreviewSink<S> {
    fn write_header(&mut self, columns: &[String]) -> Result<(), BoxError> {
        self.columns = columns.to_vec();
        if self.remaining > 0 {
            println!("{}", self.columns.join(","));
        }
        self.inner.write_header(columns)
    }

    fn write_row(&mut self, row: &Row<'_>) -> Result<(), BoxError> {
        if self.remaining > 0 {
            self.remaining -= 1;
            let mut parts = vec![iso_timestamp(row.timestamp), row.index.to_string()];
            parts.extend(row.analog.iter().map(|v| format!("{v:.6}")));
            parts.extend(row.digital.iter().map(|d| if *d { "1" } else { "0" }.to_string()));
            println!("{}", parts.join(","));
        }
        self.inner.write_row(row)
    }

    fn flush(&mut self) -> Result<(), BoxError> {
        self.inner.flush()
    }

    fn close(&mut self) -> Result<(), BoxError> {
        self.inner.close()
    }
}

/// Default output path when none was given: `./logs/ni_<device>_<stamp>.csv`.
pub fn infer_output(device: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from("logs").join(format!("ni_{device}_{stamp}.csv"))
}

/// Avoid clobbering an existing file by appending `_1`, `_2`, ... before the
/// extension.
pub fn safe_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    for n in 1.. {
        let candidate = dir.join(format!("{stem}_{n}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }
    path.to_path_buf()
}
