use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("device configuration rejected: {0}")]
    Config(String),
    #[error("acquisition read timed out")]
    ReadTimeout,
    #[error("digital write failed: {0}")]
    DigitalWrite(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
