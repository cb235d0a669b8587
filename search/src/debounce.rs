//! Cancellable delayed commits.
//!
//! A [`Debouncer`] is one channel: `Idle` until something is scheduled, then
//! `Pending` with a deadline. Scheduling again while pending replaces the
//! value and pushes the deadline out. Polling at or past the deadline hands
//! the value back exactly once and returns the channel to `Idle`.
//!
//! Time is always supplied by the caller, so the same channel runs under the
//! async session (tokio's clock) and in plain synchronous code.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DebounceState<T> {
    Idle,
    Pending { value: T, deadline: Instant },
}

#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    state: DebounceState<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: DebounceState::Idle,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> &DebounceState<T> {
        &self.state
    }

    /// Arms (or re-arms) the channel. Returns the value that was pending
    /// before, if any; it will never be committed.
    pub fn schedule(&mut self, value: T, now: Instant) -> Option<T> {
        let deadline = now + self.delay;
        match std::mem::replace(&mut self.state, DebounceState::Pending { value, deadline }) {
            DebounceState::Idle => None,
            DebounceState::Pending { value, .. } => Some(value),
        }
    }

    /// Commits the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.state {
            DebounceState::Pending { deadline, .. } if *deadline <= now => self.take(),
            DebounceState::Pending { .. } | DebounceState::Idle => None,
        }
    }

    /// Commits immediately regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.take()
    }

    /// Discards the pending value without committing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.take()
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Pending { deadline, .. } => Some(*deadline),
            DebounceState::Idle => None,
        }
    }

    pub fn pending(&self) -> Option<&T> {
        match &self.state {
            DebounceState::Pending { value, .. } => Some(value),
            DebounceState::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    fn take(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, DebounceState::Idle) {
            DebounceState::Pending { value, .. } => Some(value),
            DebounceState::Idle => None,
        }
    }
}
