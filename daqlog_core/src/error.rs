use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DaqError {
    /// No full chunk became available within the read timeout. Fatal to the
    /// run; hardware timestamp attribution requires whole chunks, so there
    /// is no partial-chunk recovery.
    #[error("acquisition timeout waiting for a full sample chunk")]
    AcquisitionTimeout,
    #[error("device configuration error: {0}")]
    DeviceConfig(String),
    #[error("actuation write failed: {0}")]
    ActuationWrite(String),
    #[error("row sink error: {0}")]
    Sink(String),
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("invalid state: {0}")]
    State(String),
}

/// How a run ended when it did not fail with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Configured duration elapsed.
    DurationElapsed,
    /// Cancellation observed at a loop-iteration boundary.
    Cancelled,
    /// Cancelled during arming; the analog task was never started.
    ArmingAborted,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
