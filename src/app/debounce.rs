// LogLens - app/debounce.rs
//
// Coalesces bursts of content-changed events into single rescans.
//
// A rescan fires once the stream has been quiet for `quiet`, or once the
// first unserved event is `max_wait` old, whichever comes first. Time is
// always passed in by the caller.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    max_wait: Duration,
    /// First event not yet served by a rescan.
    first_pending: Option<Instant>,
    last_event: Option<Instant>,
}

impl Debouncer {
    /// `max_wait` is raised to `quiet` if it is shorter.
    pub fn new(quiet: Duration, max_wait: Duration) -> Self {
        Self {
            quiet,
            max_wait: max_wait.max(quiet),
            first_pending: None,
            last_event: None,
        }
    }

    /// Record a content-changed event.
    pub fn notify(&mut self, now: Instant) {
        self.first_pending.get_or_insert(now);
        self.last_event = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.first_pending.is_some()
    }

    /// When the pending rescan becomes due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        let first = self.first_pending?;
        let last = self.last_event.unwrap_or(first);
        Some((last + self.quiet).min(first + self.max_wait))
    }

    /// Returns true exactly once per burst, when its rescan is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(due) if now >= due => {
                self.cancel();
                true
            }
            _ => false,
        }
    }

    /// Drop any pending rescan (e.g. after a forced scan).
    pub fn cancel(&mut self) {
        self.first_pending = None;
        self.last_event = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(250), ms(2000));
        assert!(!d.poll(t0));
        d.notify(t0);
        assert!(!d.poll(t0 + ms(249)));
        assert!(d.poll(t0 + ms(250)));
        assert!(!d.is_pending());
        assert!(!d.poll(t0 + ms(500)), "fires once per burst");
    }

    #[test]
    fn test_burst_is_coalesced() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(250), ms(2000));
        for i in 0..5 {
            d.notify(t0 + ms(i * 100));
        }
        assert!(!d.poll(t0 + ms(600)));
        assert!(d.poll(t0 + ms(650)));
    }

    #[test]
    fn test_max_wait_caps_continuous_burst() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(250), ms(1000));
        let mut fired = 0;
        for i in 0..=33 {
            let now = t0 + ms(i * 100);
            d.notify(now);
            if d.poll(now) {
                fired += 1;
            }
        }
        assert_eq!(fired, 3, "a rescan at 1000, 2100 and 3200 ms");
    }

    #[test]
    fn test_cancel_drops_pending() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(250), ms(2000));
        d.notify(t0);
        d.cancel();
        assert_eq!(d.deadline(), None);
        assert!(!d.poll(t0 + ms(5000)));
    }

    #[test]
    fn test_max_wait_never_below_quiet() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(300), ms(100));
        d.notify(t0);
        assert_eq!(d.deadline(), Some(t0 + ms(300)));
    }
}
