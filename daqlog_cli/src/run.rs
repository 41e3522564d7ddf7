//! Config merging, hardware assembly, and run execution.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use daqlog_config::{Config, OutputFormat, ProgressMode, digital_column_name, expand_digital_spec};
use daqlog_core::cancel::CancelToken;
use daqlog_core::config::{CalibrationTiming, ChannelCfg, IgnitionTiming, TimingCfg};
use daqlog_core::{
    AcquisitionLoop, ActuationSequencer, CalibrationRun, DigitalSnapshotSource, RunParams,
    RunSummary, SampleStream, StopReason, calibration_columns, header_columns,
};
use daqlog_hardware::{SimulatedAnalog, SimulatedDigital, SimulatedDiscreteOutput};
use daqlog_traits::{Clock, MonotonicClock, NullProgress, ProgressSink, RowSink};
use eyre::WrapErr;

use crate::cli::Cli;
use crate::output::{ConsoleSink, CsvRowSink, PreviewSink, infer_output, safe_path};
use crate::progress::ConsoleProgress;

const DEFAULT_RATE_HZ: f64 = 1000.0;

pub fn run(args: &Cli, cancel: CancelToken) -> eyre::Result<()> {
    if args.ignite && args.calibrate {
        eyre::bail!("--ignite and --calibrate are mutually exclusive");
    }

    let cfg = merged_config(args)?;
    cfg.validate(args.ignite)?;

    if args.calibrate {
        run_calibration(&cfg, cancel)
    } else {
        run_logging(&cfg, args.ignite, cancel)
    }
}

/// Start from the TOML file (when given), then let CLI flags win.
fn merged_config(args: &Cli) -> eyre::Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("reading config {}", path.display()))?;
            daqlog_config::load_toml(&text)
                .wrap_err_with(|| format!("parsing config {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(device) = &args.device {
        cfg.device.name = device.clone();
    }
    if let Some(channels) = &args.channels {
        cfg.acquisition.channels = channels
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }
    if let Some(digital) = &args.digital {
        cfg.acquisition.digital = digital.clone();
    }
    if let Some(rate) = args.rate {
        cfg.acquisition.rate_hz = Some(rate);
    }
    if let Some(chunk) = args.chunk {
        cfg.acquisition.chunk = chunk;
    }
    if let Some(vmin) = args.vmin {
        cfg.acquisition.vmin = vmin;
    }
    if let Some(vmax) = args.vmax {
        cfg.acquisition.vmax = vmax;
    }
    if let Some(term) = &args.term {
        cfg.acquisition.terminal = term.parse().map_err(|e: String| eyre::eyre!(e))?;
    }
    if let Some(outfile) = &args.outfile {
        cfg.output.path = outfile.display().to_string();
    }
    if let Some(format) = &args.format {
        cfg.output.format = Some(format.parse().map_err(|e: String| eyre::eyre!(e))?);
    }
    if let Some(duration) = args.duration {
        cfg.output.duration_s = Some(duration);
    }
    if let Some(progress) = &args.progress {
        cfg.output.progress = progress.parse().map_err(|e: String| eyre::eyre!(e))?;
    }
    if let Some(interval) = args.update_interval {
        cfg.output.update_interval_s = interval;
    }
    if let Some(n) = args.print_first {
        cfg.output.print_first = n;
    }
    if let Some(window) = args.calib_window {
        cfg.calibration.window_s = window;
    }
    if let Some(rate) = args.calib_rate {
        cfg.calibration.sample_rate_hz = rate;
    }
    if args.show_raw {
        cfg.calibration.show_raw = true;
    }
    if let Some(line) = &args.buzzer_line {
        cfg.ignition.buzzer_line = Some(line.clone());
    }
    if let Some(line) = &args.igniter_line {
        cfg.ignition.igniter_line = Some(line.clone());
    }
    if let Some(s) = args.arm_seconds {
        cfg.ignition.arm_s = Some(s);
    }
    if let Some(s) = args.stabilize_seconds {
        cfg.ignition.stabilize_s = Some(s);
    }
    if let Some(s) = args.pulse_seconds {
        cfg.ignition.pulse_s = Some(s);
    }
    Ok(cfg)
}

fn digital_lines(cfg: &Config) -> eyre::Result<Vec<String>> {
    if cfg.acquisition.digital.is_empty() {
        Ok(Vec::new())
    } else {
        expand_digital_spec(&cfg.acquisition.digital)
    }
}

fn digital_source(lines: &[String]) -> Option<DigitalSnapshotSource<SimulatedDigital>> {
    if lines.is_empty() {
        None
    } else {
        Some(DigitalSnapshotSource::new(
            SimulatedDigital::new(lines.len()),
            lines.len(),
        ))
    }
}

fn run_logging(cfg: &Config, ignite: bool, cancel: CancelToken) -> eyre::Result<()> {
    let rate = cfg.acquisition.rate_hz.unwrap_or(DEFAULT_RATE_HZ);
    let chans = ChannelCfg::from(&cfg.acquisition);
    let channel_count = chans.count();
    let timing = TimingCfg::from_acquisition(&cfg.acquisition, rate);
    let lines = digital_lines(cfg)?;
    let di_columns: Vec<String> = lines.iter().map(|l| digital_column_name(l)).collect();
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());

    let path = if cfg.output.path.is_empty() {
        infer_output(&cfg.device.name)
    } else {
        PathBuf::from(&cfg.output.path)
    };
    let path = safe_path(&path);
    let format = resolve_format(cfg, &path)?;

    let duration = cfg.output.duration_s.map(Duration::from_secs_f64);
    tracing::info!(
        device = %cfg.device.name,
        channels = ?chans.channels,
        vmin = chans.vmin,
        vmax = chans.vmax,
        terminal = ?chans.terminal,
        rate_hz = rate,
        chunk = timing.chunk,
        chunk_s = timing.chunk_duration().as_secs_f64(),
        digital = ?lines,
        out = %path.display(),
        "starting acquisition"
    );
    println!(
        "Logging {} channel(s) on {} at {} Hz -> {}",
        channel_count,
        cfg.device.name,
        rate,
        path.display()
    );
    match duration {
        Some(d) => println!("Duration: {:.1} s (Ctrl+C to stop early)", d.as_secs_f64()),
        None => println!("Running until Ctrl+C"),
    }

    let stream = SampleStream::new(
        SimulatedAnalog::new(channel_count, rate),
        channel_count,
        timing,
    );
    let digital = digital_source(&lines);
    let sequencer = if ignite {
        Some(ActuationSequencer::new(
            SimulatedDiscreteOutput::new(),
            IgnitionTiming::from(&cfg.ignition),
            Arc::clone(&clock),
        )?)
    } else {
        None
    };

    // Single-variant match so a future format cannot be silently ignored.
    let csv = match format {
        OutputFormat::Csv => CsvRowSink::create(&path)?,
    };
    let sink: Box<dyn RowSink> = if cfg.output.print_first > 0 {
        Box::new(PreviewSink::new(csv, cfg.output.print_first))
    } else {
        Box::new(csv)
    };

    let mode = resolve_progress(cfg.output.progress, duration.is_some());
    let progress: Box<dyn ProgressSink> = match mode {
        ProgressMode::None => Box::new(NullProgress),
        _ => Box::new(ConsoleProgress::new()),
    };

    let params = RunParams {
        columns: header_columns(&chans.channels, &di_columns),
        duration,
        update_interval: Duration::from_secs_f64(cfg.output.update_interval_s),
        bar_progress: mode == ProgressMode::Bar,
        ..RunParams::default()
    };

    let summary = AcquisitionLoop::new(
        stream, digital, sequencer, sink, progress, cancel, clock, params,
    )
    .run()?;

    report(&summary);
    if !matches!(summary.reason, StopReason::ArmingAborted) {
        println!("Output: {}", path.display());
    }
    Ok(())
}

fn run_calibration(cfg: &Config, cancel: CancelToken) -> eyre::Result<()> {
    let rate = cfg.calibration.sample_rate_hz;
    // Small chunks keep the display responsive at calibration rates.
    let chunk = ((rate * 0.2).round() as usize).max(1);
    let channel_count = cfg.acquisition.channels.len();
    let lines = digital_lines(cfg)?;
    let di_columns: Vec<String> = lines.iter().map(|l| digital_column_name(l)).collect();
    let output_rate = 1.0 / cfg.output.update_interval_s;
    let timing = CalibrationTiming::from_cfg(&cfg.calibration, output_rate);
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());

    println!(
        "Calibration: {} channel(s) at {} Hz, {:.1} s window (Ctrl+C to stop)",
        channel_count, rate, cfg.calibration.window_s
    );

    let stream = SampleStream::new(
        SimulatedAnalog::new(channel_count, rate),
        channel_count,
        TimingCfg::new(rate, chunk),
    );
    let digital = digital_source(&lines);
    let columns = calibration_columns(&cfg.acquisition.channels, timing.show_raw, &di_columns);

    let summary = CalibrationRun::new(
        stream,
        digital,
        ConsoleSink::default(),
        cancel,
        clock,
        timing,
        columns,
    )
    .run()?;

    report(&summary);
    Ok(())
}

/// Explicit `--format` wins; otherwise the format is inferred from the
/// output extension, so `--outfile run.xlsx` fails instead of silently
/// writing CSV bytes under a misleading name.
fn resolve_format(cfg: &Config, path: &std::path::Path) -> eyre::Result<OutputFormat> {
    if let Some(format) = cfg.output.format {
        return Ok(format);
    }
    match path.extension().and_then(|e| e.to_str()) {
        None => Ok(OutputFormat::Csv),
        Some(ext) => ext
            .to_ascii_lowercase()
            .parse()
            .map_err(|e: String| eyre::eyre!(e)),
    }
}

fn resolve_progress(mode: ProgressMode, bounded: bool) -> ProgressMode {
    match mode {
        ProgressMode::Auto if bounded => ProgressMode::Bar,
        ProgressMode::Auto => ProgressMode::Counter,
        other => other,
    }
}

fn report(summary: &RunSummary) {
    let reason = match summary.reason {
        StopReason::DurationElapsed => "duration elapsed",
        StopReason::Cancelled => "cancelled",
        StopReason::ArmingAborted => "aborted during arming",
    };
    println!(
        "Done: {} rows in {:.1} s ({reason})",
        summary.rows,
        summary.elapsed.as_secs_f64()
    );
}
