use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Press time used when the host supplies a non-positive duration.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PressState {
    /// No press and no progress.
    Idle,
    /// Held; progress grows each tick.
    Pressing,
    /// Let go early; progress winds back toward zero each tick.
    Releasing,
    /// Progress reached the full duration. Stays here until reset.
    Finished,
}

/// Result of advancing a session by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still animating, schedule another tick.
    Continue,
    /// The press just completed on this tick.
    Finished,
    /// A release wound all the way back to zero.
    Settled,
    /// Nothing to animate; the tick did nothing.
    Idle,
}

impl TickOutcome {
    pub fn keeps_running(self) -> bool {
        matches!(self, TickOutcome::Continue)
    }
}

/// Timing state of one long-press button.
#[derive(Debug, Clone)]
pub struct PressSession {
    duration: Duration,
    progress: Duration,
    state: PressState,
    last_tick: Instant,
}

impl PressSession {
    pub fn new(duration: Duration, now: Instant) -> Self {
        let duration = if duration.is_zero() {
            DEFAULT_DURATION
        } else {
            duration
        };

        Self {
            duration,
            progress: Duration::ZERO,
            state: PressState::Idle,
            last_tick: now,
        }
    }

    /// Build from a duration in seconds, falling back to the default for
    /// anything that is not a positive finite number.
    pub fn from_secs_f64(secs: f64, now: Instant) -> Self {
        let duration = if secs.is_finite() && secs > 0.0 {
            Duration::try_from_secs_f64(secs).unwrap_or(DEFAULT_DURATION)
        } else {
            DEFAULT_DURATION
        };
        Self::new(duration, now)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn progress(&self) -> Duration {
        self.progress
    }

    pub fn state(&self) -> PressState {
        self.state
    }

    /// Progress as a fraction of the duration, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        (self.progress.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, PressState::Pressing | PressState::Releasing)
    }

    pub fn is_finished(&self) -> bool {
        self.state == PressState::Finished
    }

    /// Begin or resume a press. Returns true if the session changed.
    ///
    /// Resuming during a release keeps the current progress. A press that
    /// is already held, or a finished session, ignores the call.
    pub fn start_press(&mut self, now: Instant) -> bool {
        match self.state {
            PressState::Idle | PressState::Releasing => {
                debug!(from = %self.state, progress_ms = self.progress.as_millis() as u64, "press started");
                self.state = PressState::Pressing;
                self.last_tick = now;
                true
            }
            PressState::Pressing | PressState::Finished => false,
        }
    }

    /// Let go of a held press. Progress decays from the next tick on.
    pub fn end_press(&mut self) -> bool {
        if self.state != PressState::Pressing {
            return false;
        }
        debug!(progress_ms = self.progress.as_millis() as u64, "press released early");
        self.state = PressState::Releasing;
        true
    }

    /// Advance one frame. Press and release share this routine so a
    /// renewed press mid-release simply flips the direction.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if !self.is_animating() {
            return TickOutcome::Idle;
        }

        let dt = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;

        match self.state {
            PressState::Pressing => {
                self.progress = (self.progress + dt).min(self.duration);
                trace!(dt_ms = dt.as_millis() as u64, progress_ms = self.progress.as_millis() as u64, "press tick");
                if self.progress >= self.duration {
                    self.progress = self.duration;
                    self.state = PressState::Finished;
                    debug!("press finished");
                    return TickOutcome::Finished;
                }
                TickOutcome::Continue
            }
            PressState::Releasing => {
                self.progress = self.progress.saturating_sub(dt);
                trace!(dt_ms = dt.as_millis() as u64, progress_ms = self.progress.as_millis() as u64, "release tick");
                if self.progress.is_zero() {
                    self.state = PressState::Idle;
                    debug!("release settled");
                    return TickOutcome::Settled;
                }
                TickOutcome::Continue
            }
            PressState::Idle | PressState::Finished => TickOutcome::Idle,
        }
    }

    /// Return to idle with zero progress. A no-op on an idle session.
    pub fn reset(&mut self) {
        if self.state == PressState::Idle && self.progress.is_zero() {
            return;
        }
        debug!(from = %self.state, "session reset");
        self.state = PressState::Idle;
        self.progress = Duration::ZERO;
    }
}
