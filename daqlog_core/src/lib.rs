#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core acquisition logic (hardware-agnostic).
//!
//! This crate drives the DAQ run without knowing what hardware it talks to.
//! All device interactions go through the `daqlog_traits` seams:
//! `AnalogReader`, `DigitalReader`, `DiscreteOutput`, `RowSink` and
//! `ProgressSink`.
//!
//! ## Architecture
//!
//! - **Streaming**: chunked analog input with per-chunk DI snapshots
//!   (`stream`, `snapshot` modules)
//! - **Actuation**: two-stage buzzer/igniter sequencer with forced-low
//!   outputs on every exit path (`sequencer`)
//! - **Filtering**: per-channel moving average for calibration (`filter`)
//! - **Orchestration**: the single-threaded acquisition loop and the
//!   calibration run (`acquisition`, `calibrate`)
//!
//! The loop is cooperative: cancellation is a shared flag observed at
//! iteration boundaries, never a forced interrupt mid-chunk.

pub mod acquisition;
pub mod calibrate;
pub mod cancel;
pub mod chunk;
pub mod config;
pub mod conversions;
pub mod error;
pub mod filter;
pub mod hw_error;
pub mod mocks;
pub mod sequencer;
pub mod snapshot;
pub mod stream;
pub mod util;

pub use acquisition::{AcquisitionLoop, RunParams, RunSummary, header_columns};
pub use calibrate::{CalibrationRun, calibration_columns};
pub use cancel::CancelToken;
pub use chunk::SampleChunk;
pub use config::{CalibrationTiming, ChannelCfg, IgnitionTiming, Terminal, TimingCfg};
pub use error::{DaqError, Result, StopReason};
pub use filter::CalibrationFilter;
pub use sequencer::{ActuationSequencer, ActuationState, SequencerTick};
pub use snapshot::DigitalSnapshotSource;
pub use stream::SampleStream;
