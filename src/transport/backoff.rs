//! Reconnect delays.

use std::time::Duration;

/// Floor and cap of the reconnect delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl ReconnectPolicy {
    pub fn from_millis(initial_ms: u64, max_ms: u64) -> Self {
        let initial = Duration::from_millis(initial_ms.max(1));
        Self {
            initial,
            max: Duration::from_millis(max_ms).max(initial),
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_millis(1000, 30_000)
    }
}

/// Exponential backoff: the first delay is the floor, each following one
/// doubles up to the cap. [`reset`](Backoff::reset) after a successful open.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    next: Duration,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            next: policy.initial,
            policy,
        }
    }

    /// Delay before the next attempt; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = delay.saturating_mul(2).min(self.policy.max);
        delay
    }

    /// What [`next_delay`](Backoff::next_delay) would return, without advancing.
    pub fn peek(&self) -> Duration {
        self.next
    }

    pub fn reset(&mut self) {
        self.next = self.policy.initial;
    }
}
