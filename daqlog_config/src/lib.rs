#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and digital-line parsing for the DAQ logger.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated; the
//!   CLI overlays its flags on top of the file values before validation.
//! - `expand_digital_spec` turns the operator-facing line syntax
//!   (`port0/line0:3`, comma lists) into an ordered, de-duplicated line list.

use serde::Deserialize;
use std::str::FromStr;

/// Analog input terminal configuration (wiring reference mode).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TerminalMode {
    #[default]
    Rse,
    Nrse,
    Diff,
}

impl FromStr for TerminalMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RSE" => Ok(Self::Rse),
            "NRSE" => Ok(Self::Nrse),
            "DIFF" => Ok(Self::Diff),
            other => Err(format!("unknown terminal mode '{other}' (RSE|NRSE|DIFF)")),
        }
    }
}

impl std::fmt::Display for TerminalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rse => "RSE",
            Self::Nrse => "NRSE",
            Self::Diff => "DIFF",
        };
        f.write_str(s)
    }
}

/// Progress display mode. `Auto` resolves to `Bar` when a duration is
/// configured, `Counter` otherwise.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    #[default]
    Auto,
    None,
    Counter,
    Bar,
}

impl FromStr for ProgressMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "counter" => Ok(Self::Counter),
            "bar" => Ok(Self::Bar),
            other => Err(format!(
                "unknown progress mode '{other}' (auto|none|counter|bar)"
            )),
        }
    }
}

/// Output file format. Only CSV ships with this workspace; the row-sink seam
/// in `daqlog_traits` admits other writers externally.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported output format '{other}' (csv)")),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Device {
    /// NI-DAQmx device name/alias (e.g. "Dev1").
    pub name: String,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            name: "Dev1".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Acquisition {
    /// AI channels relative to the device, order-significant (column order).
    pub channels: Vec<String>,
    /// Optional DI line spec, e.g. "port0/line0:3" or "port0/line0,port0/line3".
    pub digital: String,
    /// Hardware sample rate in Hz. When absent the CLI applies the mode
    /// default (1000 for logging, 1 for calibration display).
    pub rate_hz: Option<f64>,
    /// Samples per read per channel; also sets the DI snapshot cadence
    /// (`rate_hz / chunk` snapshots per second).
    pub chunk: usize,
    /// Expected AI voltage range in volts.
    pub vmin: f64,
    pub vmax: f64,
    pub terminal: TerminalMode,
    /// Per-read timeout in seconds; 0 selects the default of several chunk
    /// durations (min 2 s).
    pub read_timeout_s: f64,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            digital: String::new(),
            rate_hz: None,
            chunk: 1000,
            vmin: -10.0,
            vmax: 10.0,
            terminal: TerminalMode::Rse,
            read_timeout_s: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Output {
    /// Output file path; auto-named under ./logs when empty.
    pub path: String,
    pub format: Option<OutputFormat>,
    /// Seconds to run; omit to run until cancelled.
    pub duration_s: Option<f64>,
    pub progress: ProgressMode,
    /// Seconds between progress updates.
    pub update_interval_s: f64,
    /// Echo the first N logged rows to the console.
    pub print_first: usize,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            path: String::new(),
            format: None,
            duration_s: None,
            progress: ProgressMode::Auto,
            update_interval_s: 0.5,
            print_first: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalibrationCfg {
    /// Moving-average window in seconds (0 disables averaging).
    pub window_s: f64,
    /// Internal hardware sampling rate feeding the moving average.
    pub sample_rate_hz: f64,
    /// Also emit raw instantaneous values next to the averages.
    pub show_raw: bool,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            window_s: 5.0,
            sample_rate_hz: 100.0,
            show_raw: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct IgnitionCfg {
    /// Digital output line for the pre-warning buzzer (e.g. "port1/line0").
    pub buzzer_line: Option<String>,
    /// Digital output line for the igniter relay.
    pub igniter_line: Option<String>,
    /// Seconds to sound the buzzer before acquisition starts.
    pub arm_s: Option<f64>,
    /// Seconds after acquisition start before firing.
    pub stabilize_s: Option<f64>,
    /// Relay ON time in seconds.
    pub pulse_s: Option<f64>,
}

impl IgnitionCfg {
    pub fn arm_s(&self) -> f64 {
        self.arm_s.unwrap_or(15.0)
    }
    pub fn stabilize_s(&self) -> f64 {
        self.stabilize_s.unwrap_or(1.0)
    }
    pub fn pulse_s(&self) -> f64 {
        self.pulse_s.unwrap_or(1.0)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Logging {
    /// Path to a JSON-lines log file.
    pub file: Option<String>,
    /// "error" | "warn" | "info" | "debug" | "trace"
    pub level: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub device: Device,
    pub acquisition: Acquisition,
    pub output: Output,
    pub calibration: CalibrationCfg,
    pub ignition: IgnitionCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Validate the merged (file + CLI) configuration for a run.
    ///
    /// `ignite` says whether the ignition sequence was requested; the line
    /// fields are only mandatory in that case.
    pub fn validate(&self, ignite: bool) -> eyre::Result<()> {
        let a = &self.acquisition;
        if a.channels.is_empty() {
            eyre::bail!("at least one analog input channel is required");
        }
        let mut seen = std::collections::HashSet::new();
        for ch in &a.channels {
            if ch.trim().is_empty() {
                eyre::bail!("empty analog channel name");
            }
            if !seen.insert(ch.as_str()) {
                eyre::bail!("duplicate analog channel '{ch}'");
            }
        }
        if let Some(rate) = a.rate_hz
            && !(rate.is_finite() && rate > 0.0)
        {
            eyre::bail!("rate_hz must be > 0");
        }
        if a.chunk == 0 {
            eyre::bail!("chunk must be >= 1");
        }
        if !(a.vmin.is_finite() && a.vmax.is_finite() && a.vmin < a.vmax) {
            eyre::bail!("voltage range requires vmin < vmax");
        }
        if !(a.read_timeout_s.is_finite() && a.read_timeout_s >= 0.0) {
            eyre::bail!("read_timeout_s must be >= 0");
        }
        // Parse errors in the DI spec surface at validation, not mid-run.
        expand_digital_spec(&a.digital)?;

        let o = &self.output;
        if let Some(d) = o.duration_s
            && !(d.is_finite() && d > 0.0)
        {
            eyre::bail!("duration_s must be > 0");
        }
        if !(o.update_interval_s.is_finite() && o.update_interval_s > 0.0) {
            eyre::bail!("update_interval_s must be > 0");
        }

        let c = &self.calibration;
        if !(c.sample_rate_hz.is_finite() && c.sample_rate_hz > 0.0) {
            eyre::bail!("calibration sample_rate_hz must be > 0");
        }
        if !(c.window_s.is_finite() && c.window_s >= 0.0) {
            eyre::bail!("calibration window_s must be >= 0");
        }

        if ignite {
            self.validate_ignition()?;
        }
        Ok(())
    }

    fn validate_ignition(&self) -> eyre::Result<()> {
        let i = &self.ignition;
        let Some(buzzer) = i.buzzer_line.as_deref().filter(|s| !s.trim().is_empty()) else {
            eyre::bail!("ignition requires buzzer_line");
        };
        let Some(igniter) = i.igniter_line.as_deref().filter(|s| !s.trim().is_empty()) else {
            eyre::bail!("ignition requires igniter_line");
        };
        if buzzer == igniter {
            eyre::bail!("buzzer_line and igniter_line must be distinct");
        }
        for (name, v) in [
            ("arm_s", i.arm_s()),
            ("stabilize_s", i.stabilize_s()),
            ("pulse_s", i.pulse_s()),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                eyre::bail!("ignition {name} must be >= 0");
            }
        }
        if i.pulse_s() == 0.0 {
            eyre::bail!("ignition pulse_s must be > 0");
        }
        Ok(())
    }
}

/// Expand an operator-facing digital line spec into an ordered line list.
///
/// Accepts comma-separated tokens; a token of the form `portX/lineA:B`
/// expands to the inclusive range (normalized ascending even when written
/// `B:A`). Duplicates are dropped, keeping the first occurrence's position.
pub fn expand_digital_spec(spec: &str) -> eyre::Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    if spec.trim().is_empty() {
        return Ok(out);
    }
    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if token.contains(':') {
            let Some((port, range)) = split_range_token(token) else {
                eyre::bail!("digital range token '{token}' must look like portX/lineA:B");
            };
            let Some((a, b)) = range.split_once(':') else {
                eyre::bail!("digital range token '{token}' must look like portX/lineA:B");
            };
            let a: u32 = a
                .parse()
                .map_err(|_| eyre::eyre!("bad line number in '{token}'"))?;
            let b: u32 = b
                .parse()
                .map_err(|_| eyre::eyre!("bad line number in '{token}'"))?;
            let (lo, hi) = if b < a { (b, a) } else { (a, b) };
            for i in lo..=hi {
                let line = format!("{port}/line{i}");
                if seen.insert(line.clone()) {
                    out.push(line);
                }
            }
        } else if seen.insert(token.to_string()) {
            out.push(token.to_string());
        }
    }
    Ok(out)
}

/// Split "port0/line0:3" into ("port0", "0:3"); None when '/line' is absent.
fn split_range_token(token: &str) -> Option<(&str, &str)> {
    let idx = token.rfind("/line")?;
    let range = &token[idx + "/line".len()..];
    if range.is_empty() {
        return None;
    }
    Some((&token[..idx], range))
}

/// Column header for a DI line: "port0/line3" -> "di_port0_line3".
pub fn digital_column_name(line: &str) -> String {
    let mut name = String::with_capacity(line.len() + 3);
    name.push_str("di_");
    for ch in line.chars() {
        name.push(match ch {
            '/' | ':' => '_',
            c => c,
        });
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digital_column_names_are_flattened() {
        assert_eq!(digital_column_name("port0/line3"), "di_port0_line3");
    }

    #[test]
    fn empty_spec_expands_to_nothing() {
        assert!(expand_digital_spec("").unwrap().is_empty());
        assert!(expand_digital_spec("  ").unwrap().is_empty());
    }
}
