//! Cooperative cancellation token.
//!
//! Cancellation may be requested from any thread (e.g. a SIGINT handler) but
//! is only observed at loop-iteration boundaries; a blocking hardware read in
//! progress completes or times out before cancellation takes effect, so
//! cancellation latency is bounded by one read timeout.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
