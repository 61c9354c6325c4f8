//! Coalescing of bursty input changes into single search requests.
//!
//! The gate holds no timers. Callers pass a monotonic clock reading in
//! milliseconds to [`DebounceGate::notify`] and [`DebounceGate::poll`].
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DEBOUNCE_MS;

/// Identifies one burst of input changes. Later generations supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Single-slot, restartable quiet-period gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceGate {
    delay_ms: u64,
    generation: u64,
    deadline_ms: Option<u64>,
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl DebounceGate {
    #[must_use]
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            generation: 0,
            deadline_ms: None,
        }
    }

    /// Record an input change, restarting the quiet period.
    pub fn notify(&mut self, now_ms: u64) -> Generation {
        self.generation += 1;
        self.deadline_ms = Some(now_ms.saturating_add(self.delay_ms));
        Generation(self.generation)
    }

    /// Fire once when the quiet period has elapsed since the last change.
    pub fn poll(&mut self, now_ms: u64) -> Option<Generation> {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                Some(Generation(self.generation))
            }
            _ => None,
        }
    }

    /// Fire immediately if a change is pending, skipping the quiet period.
    pub fn flush(&mut self) -> Option<Generation> {
        self.deadline_ms
            .take()
            .map(|_| Generation(self.generation))
    }

    /// Drop the pending trigger without firing. Results already in flight
    /// become stale.
    pub fn cancel(&mut self) {
        if self.deadline_ms.take().is_some() {
            self.generation += 1;
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// `true` while no newer change has been recorded.
    #[must_use]
    pub const fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }

    #[must_use]
    pub const fn current(&self) -> Generation {
        Generation(self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_changes_fires_once_after_quiet_period() {
        let mut gate = DebounceGate::new(300);
        gate.notify(0);
        gate.notify(100);
        let last = gate.notify(250);
        assert_eq!(gate.poll(400), None);
        assert_eq!(gate.poll(550), Some(last));
        assert_eq!(gate.poll(900), None);
        assert!(!gate.is_pending());
    }

    #[test]
    fn newer_change_makes_older_generation_stale() {
        let mut gate = DebounceGate::new(10);
        let first = gate.notify(0);
        assert_eq!(gate.poll(10), Some(first));
        let second = gate.notify(20);
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn cancel_discards_pending_trigger() {
        let mut gate = DebounceGate::new(10);
        let pending = gate.notify(0);
        gate.cancel();
        assert_eq!(gate.poll(100), None);
        assert!(!gate.is_current(pending));
    }

    #[test]
    fn flush_skips_the_wait() {
        let mut gate = DebounceGate::default();
        assert_eq!(gate.flush(), None);
        let generation = gate.notify(5);
        assert_eq!(gate.flush(), Some(generation));
        assert_eq!(gate.current().value(), 1);
    }
}
