//! Actuation sequencer timing and safety behavior, driven by a test clock.

use std::sync::Arc;
use std::time::Duration;

use daqlog_core::config::IgnitionTiming;
use daqlog_core::{ActuationSequencer, ActuationState, SequencerTick};
use daqlog_hardware::SimulatedDiscreteOutput;
use daqlog_traits::Clock;
use daqlog_traits::clock::test_clock::TestClock;
use rstest::rstest;

fn timing() -> IgnitionTiming {
    IgnitionTiming {
        arm: Duration::from_millis(200),
        stabilize: Duration::from_millis(100),
        pulse: Duration::from_millis(100),
    }
}

fn sequencer() -> (
    ActuationSequencer<SimulatedDiscreteOutput>,
    SimulatedDiscreteOutput,
    TestClock,
) {
    let out = SimulatedDiscreteOutput::new();
    let clock = TestClock::new();
    let seq = ActuationSequencer::new(out.clone(), timing(), Arc::new(clock.clone()))
        .expect("setup write cannot fail on the simulator");
    (seq, out, clock)
}

#[test]
fn setup_forces_both_outputs_low() {
    let (seq, out, _clock) = sequencer();
    assert_eq!(out.history(), vec![[false, false]]);
    assert_eq!(out.levels(), [false, false]);
    assert_eq!(seq.state(), ActuationState::Idle);
}

#[test]
fn full_sequence_drives_buzzer_then_igniter_pulse() {
    let (mut seq, out, clock) = sequencer();

    seq.arm().expect("arm from idle");
    assert_eq!(out.levels(), [true, false]);

    // Before the arming deadline nothing moves.
    clock.advance(Duration::from_millis(199));
    assert_eq!(seq.poll().unwrap(), SequencerTick::Unchanged);
    assert_eq!(out.levels(), [true, false]);

    clock.advance(Duration::from_millis(1));
    assert_eq!(seq.poll().unwrap(), SequencerTick::ArmingDone);
    assert_eq!(out.levels(), [false, false]);

    clock.advance(Duration::from_millis(100));
    assert_eq!(seq.poll().unwrap(), SequencerTick::Fired);
    assert_eq!(out.levels(), [false, true]);

    clock.advance(Duration::from_millis(100));
    assert_eq!(seq.poll().unwrap(), SequencerTick::PulseComplete);
    assert_eq!(out.levels(), [false, false]);
    assert_eq!(seq.state(), ActuationState::Cooldown);

    // Every write the hardware ever saw, in order.
    assert_eq!(
        out.history(),
        vec![
            [false, false], // setup
            [false, false], // arm precondition
            [true, false],  // buzzer on
            [false, false], // buzzer off
            [false, true],  // igniter pulse
            [false, false], // pulse complete
        ]
    );
}

#[rstest]
#[case::defaults(200, 100, 100)]
#[case::long_stabilize(50, 400, 250)]
#[case::fire_at_stream_start(1000, 0, 50)]
fn deadlines_follow_the_configured_timing(
    #[case] arm_ms: u64,
    #[case] stabilize_ms: u64,
    #[case] pulse_ms: u64,
) {
    let out = SimulatedDiscreteOutput::new();
    let clock = TestClock::new();
    let timing = IgnitionTiming {
        arm: Duration::from_millis(arm_ms),
        stabilize: Duration::from_millis(stabilize_ms),
        pulse: Duration::from_millis(pulse_ms),
    };
    let mut seq =
        ActuationSequencer::new(out.clone(), timing, Arc::new(clock.clone())).unwrap();

    seq.arm().unwrap();
    clock.advance(Duration::from_millis(arm_ms));
    assert_eq!(seq.poll().unwrap(), SequencerTick::ArmingDone);

    clock.advance(Duration::from_millis(stabilize_ms));
    assert_eq!(seq.poll().unwrap(), SequencerTick::Fired);
    assert_eq!(out.levels(), [false, true]);

    clock.advance(Duration::from_millis(pulse_ms));
    assert_eq!(seq.poll().unwrap(), SequencerTick::PulseComplete);
    assert_eq!(out.levels(), [false, false]);
}

#[test]
fn poll_advances_at_most_one_transition() {
    let (mut seq, out, clock) = sequencer();
    seq.arm().unwrap();

    // Jump far past every deadline at once.
    clock.advance(Duration::from_secs(10));
    assert_eq!(seq.poll().unwrap(), SequencerTick::ArmingDone);
    // The igniter must not have fired in the same poll.
    assert_eq!(out.levels(), [false, false]);
    assert!(matches!(seq.state(), ActuationState::Stabilizing { .. }));
}

#[test]
fn arming_remaining_counts_down() {
    let (mut seq, _out, clock) = sequencer();
    assert_eq!(seq.arming_remaining(), None);
    seq.arm().unwrap();
    assert_eq!(seq.arming_remaining(), Some(Duration::from_millis(200)));
    clock.advance(Duration::from_millis(150));
    assert_eq!(seq.arming_remaining(), Some(Duration::from_millis(50)));
}

#[test]
fn abort_during_arming_forces_low_and_is_idempotent() {
    let (mut seq, out, clock) = sequencer();
    seq.arm().unwrap();
    assert_eq!(out.levels(), [true, false]);

    seq.abort();
    assert_eq!(out.levels(), [false, false]);
    assert_eq!(seq.state(), ActuationState::Aborted);

    // A second abort and further polls change nothing.
    seq.abort();
    clock.advance(Duration::from_secs(1));
    assert_eq!(seq.poll().unwrap(), SequencerTick::Unchanged);
    assert_eq!(seq.state(), ActuationState::Aborted);
    assert_eq!(out.levels(), [false, false]);
}

#[test]
fn acquisition_start_reanchors_the_firing_deadline() {
    let (mut seq, out, clock) = sequencer();
    seq.arm().unwrap();

    clock.advance(Duration::from_millis(200));
    assert_eq!(seq.poll().unwrap(), SequencerTick::ArmingDone);

    // The stream starts 80 ms later; firing counts from there.
    clock.advance(Duration::from_millis(80));
    seq.mark_acquisition_start(clock.now());

    // Past the un-anchored deadline, but not the re-anchored one.
    clock.advance(Duration::from_millis(40));
    assert_eq!(seq.poll().unwrap(), SequencerTick::Unchanged);
    assert_eq!(out.levels(), [false, false]);

    clock.advance(Duration::from_millis(60));
    assert_eq!(seq.poll().unwrap(), SequencerTick::Fired);
    assert_eq!(out.levels(), [false, true]);
}

#[test]
fn arm_is_rejected_outside_idle() {
    let (mut seq, _out, _clock) = sequencer();
    seq.arm().unwrap();
    assert!(seq.arm().is_err());
}

#[test]
fn drop_writes_low_when_outputs_were_left_high() {
    let out = SimulatedDiscreteOutput::new();
    let clock = TestClock::new();
    {
        let mut seq =
            ActuationSequencer::new(out.clone(), timing(), Arc::new(clock.clone())).unwrap();
        seq.arm().unwrap();
        assert_eq!(out.levels(), [true, false]);
    }
    assert_eq!(out.levels(), [false, false]);
}
