//! Trailing-edge debouncing for value-change notifications.
//!
//! Every change schedules the notification; another change inside the quiet
//! window pushes it back. The owner polls with the current time and emits once
//! the window has passed since the last change.
//!
//! Time is always passed in, so the debouncer does no I/O and is
//! deterministic under test.

use std::time::Duration;

use web_time::Instant;

/// Default quiet period in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Debouncer {
    /// When the last change was scheduled, if one is pending.
    pending_since: Option<Instant>,
    window: Duration,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            pending_since: None,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register a change at `now`, restarting the quiet window.
    pub fn schedule(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    /// Returns true exactly once when the window has elapsed since the last
    /// `schedule`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.window => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending notification.
    pub fn cancel(&mut self) {
        self.pending_since = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_new_debouncer_is_idle() {
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(Instant::now()));
        assert_eq!(debouncer.window(), ms(300));
    }

    #[test]
    fn test_fires_after_window() {
        let mut debouncer = Debouncer::new(ms(100));
        let t0 = Instant::now();

        debouncer.schedule(t0);
        assert!(!debouncer.poll(t0));
        assert!(!debouncer.poll(t0 + ms(99)));
        assert!(debouncer.poll(t0 + ms(100)));
        // Only once
        assert!(!debouncer.poll(t0 + ms(500)));
    }

    #[test]
    fn test_rapid_changes_coalesce() {
        let mut debouncer = Debouncer::new(ms(100));
        let t0 = Instant::now();

        debouncer.schedule(t0);
        debouncer.schedule(t0 + ms(60));
        debouncer.schedule(t0 + ms(120));
        assert!(!debouncer.poll(t0 + ms(200)));
        assert!(debouncer.poll(t0 + ms(220)));
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = Debouncer::new(ms(100));
        let t0 = Instant::now();
        debouncer.schedule(t0);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(t0 + ms(1000)));
    }
}
