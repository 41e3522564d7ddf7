//! Maps `Box<dyn Error>` from trait boundaries to typed `DaqError`.
//!
//! The traits in `daqlog_traits` use `Box<dyn Error + Send + Sync>` for
//! maximum flexibility; this module converts those to our typed error enum,
//! with an optional feature-gated path for `daqlog_hardware::HwError`
//! downcasting.

use crate::error::DaqError;

/// Map a trait-boundary error to a typed `DaqError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> DaqError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<daqlog_hardware::HwError>() {
            return match hw {
                daqlog_hardware::HwError::ReadTimeout => DaqError::AcquisitionTimeout,
                daqlog_hardware::HwError::Config(msg) => DaqError::DeviceConfig(msg.clone()),
                daqlog_hardware::HwError::DigitalWrite(msg) => {
                    DaqError::ActuationWrite(msg.clone())
                }
                other => DaqError::Hardware(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        DaqError::AcquisitionTimeout
    } else {
        DaqError::Hardware(s)
    }
}
