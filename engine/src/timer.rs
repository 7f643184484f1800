//! Caller-driven deadlines.
//!
//! The engine owns no runtime timers. Every timed behavior (render debounce,
//! transient overlays, countdown ticks) is a [`Deadline`] that the event loop
//! drives by passing the current `Instant` into `tick`. Each owner holds at
//! most one pending deadline; arming always replaces the previous one.

use std::time::{Duration, Instant};

/// A single pending point in time, owned by exactly one component.
#[derive(Debug, Default, Clone, Copy)]
pub struct Deadline {
    due: Option<Instant>,
}

impl Deadline {
    /// Arm (or re-arm) the deadline. Any pending deadline is replaced.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.due = Some(now + after);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// Consume the deadline if it has come due.
    ///
    /// Returns `true` at most once per arming.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Deadline;
    use std::time::{Duration, Instant};

    #[test]
    fn unarmed_never_fires() {
        let mut deadline = Deadline::default();
        assert!(!deadline.fire(Instant::now()));
    }

    #[test]
    fn fires_once_when_due() {
        let start = Instant::now();
        let mut deadline = Deadline::default();
        deadline.arm(start, Duration::from_millis(80));
        assert!(!deadline.fire(start + Duration::from_millis(79)));
        assert!(deadline.fire(start + Duration::from_millis(80)));
        assert!(!deadline.fire(start + Duration::from_millis(200)));
    }

    #[test]
    fn rearming_replaces_pending_deadline() {
        let start = Instant::now();
        let mut deadline = Deadline::default();
        deadline.arm(start, Duration::from_millis(80));
        deadline.arm(start + Duration::from_millis(50), Duration::from_millis(80));
        assert!(!deadline.fire(start + Duration::from_millis(100)));
        assert!(deadline.fire(start + Duration::from_millis(130)));
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut deadline = Deadline::default();
        deadline.arm(start, Duration::from_millis(10));
        deadline.cancel();
        assert!(!deadline.is_armed());
        assert!(!deadline.fire(start + Duration::from_secs(1)));
    }
}
