use daqlog_config::{Config, OutputFormat, ProgressMode, TerminalMode, load_toml};

fn base_toml() -> &'static str {
    r#"
[device]
name = "Dev1"

[acquisition]
channels = ["ai0", "ai1"]
digital = "port0/line0:3"
rate_hz = 1000.0
chunk = 1000
vmin = -10.0
vmax = 10.0
terminal = "RSE"

[output]
progress = "auto"
update_interval_s = 0.5

[calibration]
window_s = 5.0
sample_rate_hz = 100.0

[ignition]
buzzer_line = "port1/line0"
igniter_line = "port1/line1"
arm_s = 15.0
stabilize_s = 1.0
pulse_s = 1.0
"#
}

#[test]
fn parses_and_validates_full_config() {
    let cfg = load_toml(base_toml()).expect("parse TOML");
    assert_eq!(cfg.device.name, "Dev1");
    assert_eq!(cfg.acquisition.terminal, TerminalMode::Rse);
    assert_eq!(cfg.output.progress, ProgressMode::Auto);
    cfg.validate(true).expect("valid with ignition");
    cfg.validate(false).expect("valid without ignition");
}

#[test]
fn defaults_fill_missing_sections() {
    let cfg = load_toml("[acquisition]\nchannels = [\"ai0\"]\n").expect("parse");
    assert_eq!(cfg.acquisition.chunk, 1000);
    assert_eq!(cfg.acquisition.vmin, -10.0);
    assert_eq!(cfg.calibration.sample_rate_hz, 100.0);
    assert!(cfg.output.duration_s.is_none());
    cfg.validate(false).expect("defaults are valid");
}

#[test]
fn rejects_empty_channel_list() {
    let cfg = Config::default();
    let err = cfg.validate(false).expect_err("no channels");
    assert!(format!("{err}").contains("analog input channel"));
}

#[test]
fn rejects_duplicate_channels() {
    let mut cfg = load_toml(base_toml()).unwrap();
    cfg.acquisition.channels = vec!["ai0".into(), "ai0".into()];
    let err = cfg.validate(false).expect_err("dup channels");
    assert!(format!("{err}").contains("duplicate"));
}

#[test]
fn rejects_inverted_voltage_range() {
    let mut cfg = load_toml(base_toml()).unwrap();
    cfg.acquisition.vmin = 5.0;
    cfg.acquisition.vmax = -5.0;
    assert!(cfg.validate(false).is_err());
}

#[test]
fn rejects_zero_rate_and_chunk() {
    let mut cfg = load_toml(base_toml()).unwrap();
    cfg.acquisition.rate_hz = Some(0.0);
    assert!(cfg.validate(false).is_err());

    let mut cfg = load_toml(base_toml()).unwrap();
    cfg.acquisition.chunk = 0;
    assert!(cfg.validate(false).is_err());
}

#[test]
fn ignition_requires_both_lines() {
    let mut cfg = load_toml(base_toml()).unwrap();
    cfg.ignition.igniter_line = None;
    assert!(cfg.validate(false).is_ok(), "lines optional without ignite");
    let err = cfg.validate(true).expect_err("missing igniter line");
    assert!(format!("{err}").contains("igniter_line"));
}

#[test]
fn ignition_lines_must_be_distinct() {
    let mut cfg = load_toml(base_toml()).unwrap();
    cfg.ignition.igniter_line = cfg.ignition.buzzer_line.clone();
    assert!(cfg.validate(true).is_err());
}

#[test]
fn ignition_pulse_must_be_positive() {
    let mut cfg = load_toml(base_toml()).unwrap();
    cfg.ignition.pulse_s = Some(0.0);
    assert!(cfg.validate(true).is_err());
}

#[test]
fn bad_digital_spec_fails_validation() {
    let mut cfg = load_toml(base_toml()).unwrap();
    cfg.acquisition.digital = "0:3".into();
    assert!(cfg.validate(false).is_err());
}

#[test]
fn format_parses_from_str() {
    assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
    assert!("xlsx".parse::<OutputFormat>().is_err());
}
