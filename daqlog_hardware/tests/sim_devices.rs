use daqlog_hardware::{HwError, SimulatedAnalog};
use daqlog_traits::AnalogReader;
use rstest::rstest;
use std::time::{Duration, Instant};

#[rstest]
#[case(1, 200.0, 20)]
#[case(3, 500.0, 50)]
fn paced_read_fills_whole_chunks(#[case] channels: usize, #[case] rate: f64, #[case] chunk: usize) {
    let mut ai = SimulatedAnalog::new(channels, rate);
    ai.start().unwrap();
    let mut buf = vec![f64::NAN; channels * chunk];
    ai.read_into(&mut buf, chunk, Duration::from_secs(2)).unwrap();
    assert!(buf.iter().all(|v| v.is_finite()), "no sample left unfilled");
    ai.stop().unwrap();
}

#[test]
fn reads_are_paced_by_the_sample_clock() {
    // 100 Hz, chunk of 20 -> each read takes ~200 ms of wall time.
    let mut ai = SimulatedAnalog::new(1, 100.0);
    ai.start().unwrap();
    let mut buf = vec![0.0; 20];
    let t0 = Instant::now();
    ai.read_into(&mut buf, 20, Duration::from_secs(2)).unwrap();
    ai.read_into(&mut buf, 20, Duration::from_secs(2)).unwrap();
    let elapsed = t0.elapsed();
    assert!(
        elapsed >= Duration::from_millis(300),
        "two chunks should span ~400 ms, got {elapsed:?}"
    );
}

#[test]
fn too_short_timeout_reports_read_timeout() {
    // 10 Hz, chunk of 20 -> 2 s per chunk, far beyond a 50 ms timeout.
    let mut ai = SimulatedAnalog::new(1, 10.0);
    ai.start().unwrap();
    let mut buf = vec![0.0; 20];
    let err = ai
        .read_into(&mut buf, 20, Duration::from_millis(50))
        .expect_err("timeout expected");
    let hw = err.downcast_ref::<HwError>().expect("typed error");
    assert!(matches!(hw, HwError::ReadTimeout));
}

#[test]
fn samples_are_continuous_across_chunks() {
    let mut ai = SimulatedAnalog::new(1, 1000.0);
    ai.start().unwrap();
    let mut a = vec![0.0; 100];
    let mut b = vec![0.0; 100];
    ai.read_into(&mut a, 100, Duration::from_secs(2)).unwrap();
    ai.read_into(&mut b, 100, Duration::from_secs(2)).unwrap();
    // The sine continues where the previous chunk stopped.
    let t = 100.0 / 1000.0;
    let expected = (2.0 * std::f64::consts::PI * 10.0 * t).sin();
    assert!((b[0] - expected).abs() < 1e-9);
}
