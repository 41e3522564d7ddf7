//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// NI USB-600x data logger: fixed-rate analog acquisition with per-chunk
/// digital snapshots, CSV output, and an optional timed ignition sequence.
#[derive(Parser, Debug)]
#[command(name = "daqlog", version, about = "DAQ CSV logger")]
pub struct Cli {
    /// Path to config TOML; CLI flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// DAQmx device name/alias
    #[arg(long, value_name = "DEV")]
    pub device: Option<String>,

    /// AI channels, comma separated (e.g. ai0,ai1); column order follows this
    #[arg(long, value_name = "CHANS")]
    pub channels: Option<String>,

    /// DI line spec (e.g. port0/line0:3 or port0/line0,port0/line3)
    #[arg(long, value_name = "SPEC")]
    pub digital: Option<String>,

    /// Sample rate in Hz
    #[arg(long, value_name = "HZ")]
    pub rate: Option<f64>,

    /// Samples per read per channel
    #[arg(long, value_name = "N")]
    pub chunk: Option<usize>,

    /// Expected minimum voltage
    #[arg(long, value_name = "V", allow_negative_numbers = true)]
    pub vmin: Option<f64>,

    /// Expected maximum voltage
    #[arg(long, value_name = "V", allow_negative_numbers = true)]
    pub vmax: Option<f64>,

    /// Terminal configuration (RSE|NRSE|DIFF)
    #[arg(long, value_name = "MODE")]
    pub term: Option<String>,

    /// Output CSV path; auto-named under ./logs when omitted
    #[arg(long, value_name = "FILE")]
    pub outfile: Option<PathBuf>,

    /// Output format (csv)
    #[arg(long, value_name = "FMT")]
    pub format: Option<String>,

    /// Stop after this many seconds; omit to run until Ctrl+C
    #[arg(long, value_name = "SECS")]
    pub duration: Option<f64>,

    /// Progress display (auto|none|counter|bar)
    #[arg(long, value_name = "MODE")]
    pub progress: Option<String>,

    /// Seconds between progress updates
    #[arg(long = "update-interval", value_name = "SECS")]
    pub update_interval: Option<f64>,

    /// Echo the first N logged rows to the console
    #[arg(long = "print-first", value_name = "N")]
    pub print_first: Option<usize>,

    /// Calibration mode: print windowed moving averages instead of logging
    #[arg(long, action = ArgAction::SetTrue)]
    pub calibrate: bool,

    /// Calibration moving-average window in seconds
    #[arg(long = "calib-window", value_name = "SECS")]
    pub calib_window: Option<f64>,

    /// Calibration sample rate in Hz
    #[arg(long = "calib-rate", value_name = "HZ")]
    pub calib_rate: Option<f64>,

    /// Also show raw instantaneous values in calibration output
    #[arg(long = "show-raw", action = ArgAction::SetTrue)]
    pub show_raw: bool,

    /// Run the ignition sequence (buzzer arming, then a timed igniter pulse)
    #[arg(long, action = ArgAction::SetTrue)]
    pub ignite: bool,

    /// DO line driving the arming buzzer (e.g. port1/line0)
    #[arg(long = "buzzer-line", value_name = "LINE")]
    pub buzzer_line: Option<String>,

    /// DO line driving the igniter relay (e.g. port1/line1)
    #[arg(long = "igniter-line", value_name = "LINE")]
    pub igniter_line: Option<String>,

    /// Buzzer pre-warning time in seconds
    #[arg(long = "arm-seconds", value_name = "SECS")]
    pub arm_seconds: Option<f64>,

    /// Delay between acquisition start and ignition in seconds
    #[arg(long = "stabilize-seconds", value_name = "SECS")]
    pub stabilize_seconds: Option<f64>,

    /// Igniter pulse width in seconds
    #[arg(long = "pulse-seconds", value_name = "SECS")]
    pub pulse_seconds: Option<f64>,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Also write logs to this file
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}
