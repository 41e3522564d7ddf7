//! Two-stage safety actuation state machine (buzzer pre-warning, then a
//! timed relay pulse).
//!
//! The sequencer exclusively owns the two discrete output lines; every write
//! is a two-element atomic `[buzzer, igniter]` pair so the hardware never
//! observes an inconsistent combination. The machine performs at most one
//! state transition per poll, keeping output writes serialized and
//! auditable even when multiple deadlines have already passed.
//!
//! Safety contract: the igniter is high only inside an explicitly bounded
//! firing window, and both outputs are forced low on every exit path,
//! including cancellation and error. A `Drop` backstop covers paths that
//! never reach the explicit shutdown call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use daqlog_traits::{Clock, DiscreteOutput};
use eyre::WrapErr;

use crate::config::IgnitionTiming;
use crate::error::{DaqError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationState {
    Idle,
    /// Buzzer on until `deadline`.
    Arming { deadline: Instant },
    /// Waiting for the settling delay after acquisition start.
    Stabilizing { fire_at: Instant },
    /// Igniter on until `until`.
    Firing { until: Instant },
    Cooldown,
    Aborted,
}

/// What a single poll did. One poll applies at most one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerTick {
    Unchanged,
    /// Arming deadline elapsed; buzzer silenced, now stabilizing.
    ArmingDone,
    /// Stabilization deadline reached; igniter on.
    Fired,
    /// Pulse window closed; igniter off, sequence complete.
    PulseComplete,
}

pub struct ActuationSequencer<W: DiscreteOutput> {
    writer: W,
    timing: IgnitionTiming,
    clock: Arc<dyn Clock + Send + Sync>,
    state: ActuationState,
    start_mark: Option<Instant>,
    outputs: [bool; 2],
}

impl<W: DiscreteOutput> ActuationSequencer<W> {
    /// Take ownership of the output pair and force both lines low before
    /// anything else happens. A failure here is a configuration error: no
    /// line has been driven high yet.
    pub fn new(
        mut writer: W,
        timing: IgnitionTiming,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self> {
        writer
            .write_pair([false, false])
            .map_err(|e| eyre::Report::new(DaqError::DeviceConfig(e.to_string())))
            .wrap_err("forcing actuation outputs low at setup")?;
        tracing::info!("safety: actuation outputs forced LOW at setup");
        Ok(Self {
            writer,
            timing,
            clock,
            state: ActuationState::Idle,
            start_mark: None,
            outputs: [false, false],
        })
    }

    pub fn state(&self) -> ActuationState {
        self.state
    }

    /// Current `[buzzer, igniter]` levels as last written.
    pub fn outputs(&self) -> [bool; 2] {
        self.outputs
    }

    /// Remaining arming time, when arming.
    pub fn arming_remaining(&self) -> Option<Duration> {
        match self.state {
            ActuationState::Arming { deadline } => {
                Some(deadline.saturating_duration_since(self.clock.now()))
            }
            _ => None,
        }
    }

    /// Begin the buzzer pre-warning. Only valid from `Idle`.
    pub fn arm(&mut self) -> Result<()> {
        if self.state != ActuationState::Idle {
            return Err(eyre::Report::new(DaqError::State(format!(
                "arm requested in state {:?}",
                self.state
            ))));
        }
        // Safety precondition: both low before any other side effect.
        self.write([false, false])?;
        self.write([true, false])?;
        let deadline = self.clock.now() + self.timing.arm;
        self.state = ActuationState::Arming { deadline };
        tracing::info!(arm_s = self.timing.arm.as_secs_f64(), "arming: buzzer ON");
        Ok(())
    }

    /// Anchor the stabilization deadline to the acquisition start. If the
    /// machine already left arming, the deadline is re-anchored so firing
    /// happens `stabilize` after the stream actually started.
    pub fn mark_acquisition_start(&mut self, t0: Instant) {
        self.start_mark = Some(t0);
        if let ActuationState::Stabilizing { .. } = self.state {
            self.state = ActuationState::Stabilizing {
                fire_at: t0 + self.timing.stabilize,
            };
        }
    }

    /// Advance the machine by at most one transition based on the current
    /// clock. Called once per acquisition-loop iteration.
    pub fn poll(&mut self) -> Result<SequencerTick> {
        let now = self.clock.now();
        match self.state {
            ActuationState::Arming { deadline } if now >= deadline => {
                // Buzzer off always on leaving Arming, cancellation included.
                self.write([false, false])?;
                let base = self.start_mark.unwrap_or(now);
                self.state = ActuationState::Stabilizing {
                    fire_at: base + self.timing.stabilize,
                };
                tracing::info!("arming done: buzzer OFF, stabilizing");
                Ok(SequencerTick::ArmingDone)
            }
            ActuationState::Stabilizing { fire_at } if now >= fire_at => {
                self.write([false, true])?;
                self.state = ActuationState::Firing {
                    until: now + self.timing.pulse,
                };
                tracing::info!(
                    pulse_s = self.timing.pulse.as_secs_f64(),
                    "ignition: relay ON"
                );
                Ok(SequencerTick::Fired)
            }
            ActuationState::Firing { until } if now >= until => {
                self.write([false, false])?;
                self.state = ActuationState::Cooldown;
                tracing::info!("ignition: relay OFF");
                Ok(SequencerTick::PulseComplete)
            }
            _ => Ok(SequencerTick::Unchanged),
        }
    }

    /// Force both outputs low and stop sequencing. Idempotent; safe to call
    /// from any state and multiple times. The low write is attempted even
    /// when a previous write failed.
    pub fn abort(&mut self) {
        if let Err(e) = self.writer.write_pair([false, false]) {
            tracing::warn!(error = %e, "forcing actuation outputs low failed");
        } else {
            self.outputs = [false, false];
        }
        match self.state {
            ActuationState::Cooldown => {}
            ActuationState::Aborted => {}
            prev => {
                tracing::info!(?prev, "actuation aborted: outputs LOW");
                self.state = ActuationState::Aborted;
            }
        }
    }

    fn write(&mut self, levels: [bool; 2]) -> Result<()> {
        self.writer
            .write_pair(levels)
            .map_err(|e| eyre::Report::new(DaqError::ActuationWrite(e.to_string())))
            .wrap_err("actuation output write")?;
        self.outputs = levels;
        Ok(())
    }
}

impl<W: DiscreteOutput> Drop for ActuationSequencer<W> {
    fn drop(&mut self) {
        // Backstop for exit paths that never reached abort().
        if self.outputs != [false, false] {
            if let Err(e) = self.writer.write_pair([false, false]) {
                tracing::warn!(error = %e, "drop: forcing actuation outputs low failed");
            }
        }
    }
}
