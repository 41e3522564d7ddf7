//! Calibration run against scripted hardware: averaged output at the
//! configured cadence, stopping cleanly on cancellation.

use std::sync::Arc;
use std::time::Duration;

use daqlog_core::cancel::CancelToken;
use daqlog_core::config::{CalibrationTiming, TimingCfg};
use daqlog_core::mocks::{MemorySink, NoopDigital};
use daqlog_core::{CalibrationRun, DigitalSnapshotSource, SampleStream, StopReason, calibration_columns};
use daqlog_traits::clock::test_clock::TestClock;
use daqlog_traits::{AnalogReader, BoxError};

/// Emits a constant level, advances the shared clock per chunk, and trips
/// the cancellation token once its budget of reads is spent.
struct CancellingAnalog {
    clock: TestClock,
    cancel: CancelToken,
    reads_left: usize,
    level: f64,
    rate_hz: f64,
}

impl AnalogReader for CancellingAnalog {
    fn start(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    fn read_into(
        &mut self,
        buf: &mut [f64],
        samples_per_channel: usize,
        _timeout: Duration,
    ) -> Result<(), BoxError> {
        self.clock
            .advance(Duration::from_secs_f64(samples_per_channel as f64 / self.rate_hz));
        buf.fill(self.level);
        self.reads_left = self.reads_left.saturating_sub(1);
        if self.reads_left == 0 {
            self.cancel.cancel();
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[test]
fn averaged_rows_come_out_at_the_output_cadence() {
    let clock = TestClock::new();
    let cancel = CancelToken::new();
    let reader = CancellingAnalog {
        clock: clock.clone(),
        cancel: cancel.clone(),
        reads_left: 10,
        level: 5.0,
        rate_hz: 10.0,
    };
    // 10 Hz with 0.2 s chunks, reporting twice a second.
    let stream = SampleStream::new(reader, 1, TimingCfg::new(10.0, 2));
    let digital: Option<DigitalSnapshotSource<NoopDigital>> = None;
    let timing = CalibrationTiming {
        window: Duration::from_secs(1),
        sample_rate_hz: 10.0,
        output_rate_hz: 2.0,
        show_raw: true,
    };
    let names = vec!["ai0".to_string()];
    let cols = calibration_columns(&names, true, &[]);
    let sink = MemorySink::new();

    let summary = CalibrationRun::new(
        stream,
        digital,
        sink.clone(),
        cancel,
        Arc::new(clock),
        timing,
        cols.clone(),
    )
    .run()
    .expect("calibration stops cleanly");

    assert!(matches!(summary.reason, StopReason::Cancelled));
    assert_eq!(sink.header(), cols);
    assert!(sink.is_closed());

    let rows = sink.rows();
    // Ten 0.2 s chunks with a 0.5 s cadence: emits at 0.2, 0.8, 1.4, 2.0.
    assert_eq!(rows.len(), 4);
    assert!(sink.flushes() >= rows.len());
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.index, i as u64);
        // Constant input: average and raw value agree.
        assert_eq!(row.analog, vec![5.0, 5.0]);
    }
}
