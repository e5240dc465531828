//! Countdown and stopwatch state machine.
//!
//! The machine is pure: the live loop passes in `now` on every call, so
//! elapsed time is always a difference of two monotonic samples rather
//! than a count of ticks.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::format::{format_countdown, format_time, SolveTime};
use crate::runtime::KeyInput;

/// Countdown length in seconds
pub const COUNTDOWN_START: u8 = 15;
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);
/// Loop pacing (~100Hz). Also used while counting down so a skip is immediate.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Counting { remaining: u8, next_step: Instant },
    Running { started_at: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Counting,
    Running,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    state: ClockState,
    countdown: bool,
}

impl SessionClock {
    pub fn new(countdown: bool) -> Self {
        Self {
            state: ClockState::Idle,
            countdown,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            ClockState::Idle => Phase::Idle,
            ClockState::Counting { .. } => Phase::Counting,
            ClockState::Running { .. } => Phase::Running,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == ClockState::Idle
    }

    /// Feed a key press. Returns the solve when space stops the stopwatch.
    ///
    /// Only space has an effect; escape and interrupt are the caller's business.
    pub fn on_key(&mut self, key: KeyInput, now: Instant) -> Option<SolveTime> {
        if key != KeyInput::Space {
            return None;
        }

        match self.state {
            ClockState::Idle if self.countdown => {
                debug!("countdown started");
                self.state = ClockState::Counting {
                    remaining: COUNTDOWN_START,
                    next_step: now + COUNTDOWN_STEP,
                };
                None
            }
            ClockState::Idle => {
                self.start_running(now);
                None
            }
            ClockState::Counting { remaining, .. } => {
                debug!(remaining, "countdown skipped");
                self.start_running(now);
                None
            }
            ClockState::Running { started_at } => {
                let solve = SolveTime::from_duration(now.saturating_duration_since(started_at));
                debug!(%solve, "stopwatch stopped");
                self.state = ClockState::Idle;
                Some(solve)
            }
        }
    }

    /// Advance the countdown and return the text to show, if any.
    pub fn on_tick(&mut self, now: Instant) -> Option<String> {
        if let ClockState::Counting {
            mut remaining,
            mut next_step,
        } = self.state
        {
            while remaining > 0 && now >= next_step {
                remaining -= 1;
                next_step += COUNTDOWN_STEP;
            }

            if remaining == 0 {
                // Timing starts when the countdown expired, not when we noticed.
                self.start_running(next_step - COUNTDOWN_STEP);
            } else {
                self.state = ClockState::Counting {
                    remaining,
                    next_step,
                };
            }
        }

        self.display(now)
    }

    pub fn display(&self, now: Instant) -> Option<String> {
        match self.state {
            ClockState::Idle => None,
            ClockState::Counting { remaining, .. } => Some(format_countdown(remaining)),
            ClockState::Running { .. } => {
                format_time(self.elapsed(now).map(SolveTime::as_secs_f64))
            }
        }
    }

    pub fn elapsed(&self, now: Instant) -> Option<SolveTime> {
        match self.state {
            ClockState::Running { started_at } => Some(SolveTime::from_duration(
                now.saturating_duration_since(started_at),
            )),
            _ => None,
        }
    }

    /// Drop whatever is in progress. Returns the phase that was abandoned.
    pub fn cancel(&mut self) -> Phase {
        let abandoned = self.phase();
        self.state = ClockState::Idle;
        abandoned
    }

    fn start_running(&mut self, started_at: Instant) {
        debug!("stopwatch started");
        self.state = ClockState::Running { started_at };
    }
}
