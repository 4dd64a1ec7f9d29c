//! Deterministic timer driven by an explicit virtual clock.
//!
//! Hosts without a real event loop (tests, previews, scripted runs) schedule waits here and
//! move time forward with [`ManualTimer::advance`].

use std::cell::RefCell;

use tracing::debug;

use super::host::{TimerCallback, TimerService};

struct PendingTimer {
    deadline: u64,
    sequence: u64,
    callback: TimerCallback,
}

#[derive(Default)]
struct ClockState {
    now: u64,
    sequence: u64,
    pending: Vec<PendingTimer>,
}

/// Virtual-time [`TimerService`].
#[derive(Default)]
pub struct ManualTimer {
    state: RefCell<ClockState>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in seconds.
    pub fn now(&self) -> u64 {
        self.state.borrow().now
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Moves the clock forward by `seconds`, firing due timers in deadline order (ties fire in
    /// scheduling order). Timers scheduled by a firing callback also fire if they fall due
    /// within the same window. Returns how many callbacks ran.
    pub fn advance(&self, seconds: u64) -> usize {
        let target = self.state.borrow().now.saturating_add(seconds);
        let mut fired = 0;

        while let Some(callback) = self.pop_due(target) {
            callback();
            fired += 1;
        }

        self.state.borrow_mut().now = target;
        debug!(now = target, fired, "manual timer advanced");
        fired
    }

    fn pop_due(&self, target: u64) -> Option<TimerCallback> {
        let mut state = self.state.borrow_mut();
        let position = state
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= target)
            .min_by_key(|(_, timer)| (timer.deadline, timer.sequence))
            .map(|(position, _)| position)?;
        let timer = state.pending.remove(position);
        state.now = timer.deadline;
        Some(timer.callback)
    }
}

impl TimerService for ManualTimer {
    fn schedule(&self, seconds: u64, callback: TimerCallback) {
        let mut state = self.state.borrow_mut();
        let deadline = state.now.saturating_add(seconds);
        let sequence = state.sequence;
        state.sequence += 1;
        state.pending.push(PendingTimer {
            deadline,
            sequence,
            callback,
        });
    }
}
