//! Mapping from the TOML-facing schema (`daqlog_config`) to the runtime
//! configuration structs the engine consumes.

use std::time::Duration;

use crate::config::{CalibrationTiming, ChannelCfg, IgnitionTiming, Terminal, TimingCfg};

impl From<daqlog_config::TerminalMode> for Terminal {
    fn from(t: daqlog_config::TerminalMode) -> Self {
        match t {
            daqlog_config::TerminalMode::Rse => Terminal::Rse,
            daqlog_config::TerminalMode::Nrse => Terminal::Nrse,
            daqlog_config::TerminalMode::Diff => Terminal::Diff,
        }
    }
}

impl From<&daqlog_config::Acquisition> for ChannelCfg {
    fn from(a: &daqlog_config::Acquisition) -> Self {
        Self {
            channels: a.channels.clone(),
            vmin: a.vmin,
            vmax: a.vmax,
            terminal: a.terminal.into(),
        }
    }
}

impl TimingCfg {
    /// Build timing from the schema with the mode-resolved rate.
    /// `read_timeout_s = 0` selects the default timeout.
    pub fn from_acquisition(a: &daqlog_config::Acquisition, rate_hz: f64) -> Self {
        let mut timing = Self::new(rate_hz, a.chunk);
        if a.read_timeout_s > 0.0 {
            timing.read_timeout = Duration::from_secs_f64(a.read_timeout_s);
        }
        timing
    }
}

impl From<&daqlog_config::IgnitionCfg> for IgnitionTiming {
    fn from(i: &daqlog_config::IgnitionCfg) -> Self {
        Self {
            arm: Duration::from_secs_f64(i.arm_s()),
            stabilize: Duration::from_secs_f64(i.stabilize_s()),
            pulse: Duration::from_secs_f64(i.pulse_s()),
        }
    }
}

impl CalibrationTiming {
    /// Build calibration timing with the mode-resolved output rate.
    pub fn from_cfg(c: &daqlog_config::CalibrationCfg, output_rate_hz: f64) -> Self {
        Self {
            window: Duration::from_secs_f64(c.window_s.max(0.0)),
            sample_rate_hz: c.sample_rate_hz,
            output_rate_hz,
            show_raw: c.show_raw,
        }
    }
}
