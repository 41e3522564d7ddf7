//! Console progress rendering: in-place counter or bar on stderr.

use std::io::Write as _;
use std::time::Duration;

use daqlog_traits::{ProgressSink, ProgressUpdate};

const BAR_WIDTH: usize = 30;

/// Human-friendly sample rate.
pub fn format_rate(rate: f64) -> String {
    if rate >= 1_000_000.0 {
        format!("{:.1} MS/s", rate / 1_000_000.0)
    } else if rate >= 1_000.0 {
        format!("{:.1} kS/s", rate / 1_000.0)
    } else {
        format!("{rate:.1} S/s")
    }
}

fn format_elapsed(d: Duration) -> String {
    let total = d.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// Per-channel and total counts plus the aggregate rate across channels;
/// `instantaneous_rate` arrives per channel.
fn counter_line(
    elapsed: Duration,
    samples_per_channel: u64,
    channel_count: usize,
    instantaneous_rate: f64,
) -> String {
    let total = samples_per_channel * channel_count as u64;
    format!(
        "{}  {} samples/ch x {} ch = {}  {}",
        format_elapsed(elapsed),
        samples_per_channel,
        channel_count,
        total,
        format_rate(instantaneous_rate * channel_count as f64),
    )
}

/// Renders updates in place with carriage returns; `finish` terminates the
/// line so the shell prompt lands cleanly.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    dirty: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn render(&mut self, line: &str) {
        let mut err = std::io::stderr();
        let _ = write!(err, "\r{line:<78}");
        let _ = err.flush();
        self.dirty = true;
    }
}

impl ProgressSink for ConsoleProgress {
    fn update(&mut self, update: ProgressUpdate) {
        match update {
            ProgressUpdate::Counter {
                elapsed,
                samples_per_channel,
                channel_count,
                instantaneous_rate,
            } => {
                let line =
                    counter_line(elapsed, samples_per_channel, channel_count, instantaneous_rate);
                self.render(&line);
            }
            ProgressUpdate::Bar { elapsed, duration } => {
                let frac = if duration.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
                };
                let filled = (frac * BAR_WIDTH as f64).round() as usize;
                let line = format!(
                    "[{}{}] {:3.0}%  {}",
                    "#".repeat(filled),
                    "-".repeat(BAR_WIDTH - filled),
                    frac * 100.0,
                    format_elapsed(elapsed),
                );
                self.render(&line);
            }
            ProgressUpdate::Arming { remaining } => {
                let line = format!(
                    "ARMING  buzzer on, acquisition starts in {:.1} s",
                    remaining.as_secs_f64()
                );
                self.render(&line);
            }
        }
    }

    fn finish(&mut self) {
        if self.dirty {
            let mut err = std::io::stderr();
            let _ = writeln!(err);
            let _ = err.flush();
            self.dirty = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_units_scale() {
        assert_eq!(format_rate(850.0), "850.0 S/s");
        assert_eq!(format_rate(48_000.0), "48.0 kS/s");
        assert_eq!(format_rate(1_200_000.0), "1.2 MS/s");
    }

    #[test]
    fn elapsed_is_hms() {
        assert_eq!(format_elapsed(Duration::from_secs(3671)), "01:01:11");
    }

    #[test]
    fn counter_reports_totals_and_aggregate_rate() {
        let line = counter_line(Duration::from_secs(5), 1_000, 4, 200.0);
        assert_eq!(line, "00:00:05  1000 samples/ch x 4 ch = 4000  800.0 S/s");
    }
}
