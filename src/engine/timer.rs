//! Cancellable delayed tasks on an explicit clock.
//!
//! Time is a `Duration` since session setup, handed in by whoever drives the
//! scheduling turns. A task is owned by the component that scheduled it;
//! rescheduling replaces the pending deadline.

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelayedTask {
    due: Option<Duration>,
}

impl DelayedTask {
    pub const fn new() -> Self {
        Self { due: None }
    }

    /// (Re)start the task: fires `delay` after `now`, cancelling any pending deadline.
    pub fn schedule(&mut self, now: Duration, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.due
    }

    /// Consume the task if its deadline has passed. Returns true when it fired.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of several optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Duration>>) -> Option<Duration> {
    deadlines.into_iter().flatten().min()
}
