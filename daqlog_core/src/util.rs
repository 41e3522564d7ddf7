//! Common timing helpers for daqlog_core.

use std::time::Duration;

/// Wall-clock time spanned by one chunk at the given sample rate.
#[inline]
pub fn chunk_duration(rate_hz: f64, chunk: usize) -> Duration {
    let rate = if rate_hz > 0.0 { rate_hz } else { 1.0 };
    Duration::from_secs_f64(chunk as f64 / rate)
}

/// Default per-read timeout: ten chunk durations, never less than 2 s, so
/// short scheduling stalls do not kill a run but a dead device does.
#[inline]
pub fn default_read_timeout(rate_hz: f64, chunk: usize) -> Duration {
    let ten_chunks = chunk_duration(rate_hz, chunk) * 10;
    ten_chunks.max(Duration::from_secs(2))
}

/// Driver-side circular buffer sizing: at least ten seconds of samples or
/// two chunks per channel, whichever is larger, so short scheduling delays
/// between reads do not overrun.
#[inline]
pub fn suggested_buffer_size(rate_hz: f64, chunk: usize) -> usize {
    let ten_seconds = (rate_hz * 10.0).ceil() as usize;
    ten_seconds.max(chunk * 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_duration_matches_rate() {
        assert_eq!(chunk_duration(1000.0, 1000), Duration::from_secs(1));
        assert_eq!(chunk_duration(100.0, 10), Duration::from_millis(100));
    }

    #[test]
    fn read_timeout_never_below_two_seconds() {
        assert_eq!(default_read_timeout(1000.0, 10), Duration::from_secs(2));
        assert_eq!(default_read_timeout(1000.0, 1000), Duration::from_secs(10));
    }

    #[test]
    fn buffer_spans_ten_seconds_or_two_chunks() {
        assert_eq!(suggested_buffer_size(1000.0, 1000), 10_000);
        assert_eq!(suggested_buffer_size(10.0, 500), 1_000);
    }
}
