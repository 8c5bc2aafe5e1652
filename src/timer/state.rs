//! Pure per-room timer state machine.
//!
//! Transitions only update counters and the running flag. Scheduling the
//! tick is the room actor's job; it keeps its interval in step with
//! [`TimerState::is_running`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub seconds_remaining: u64,
    pub original_seconds: u64,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Nothing left to count down
    Ignored,
    Started,
    /// Was already running; the cadence is re-based
    Restarted,
}

#[derive(Debug, Default)]
pub struct TimerState {
    seconds_remaining: u64,
    original_seconds: u64,
    running: bool,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            seconds_remaining: self.seconds_remaining,
            original_seconds: self.original_seconds,
            running: self.running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Set both the remaining and the baseline value. Returns the value to publish.
    pub fn set_seconds(&mut self, value: u64) -> u64 {
        self.seconds_remaining = value;
        self.original_seconds = value;
        self.running = false;
        value
    }

    pub fn start(&mut self) -> StartOutcome {
        if self.seconds_remaining == 0 {
            return StartOutcome::Ignored;
        }
        if self.running {
            return StartOutcome::Restarted;
        }
        self.running = true;
        StartOutcome::Started
    }

    /// Restore the baseline. Returns the value to publish.
    pub fn reset(&mut self) -> u64 {
        self.seconds_remaining = self.original_seconds;
        self.running = false;
        self.seconds_remaining
    }

    /// Returns whether the timer was running.
    pub fn pause(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    /// One decrement. Returns the value to publish, or `None` when idle.
    pub fn tick(&mut self) -> Option<u64> {
        if !self.running {
            return None;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            self.running = false;
        }
        Some(self.seconds_remaining)
    }
}
