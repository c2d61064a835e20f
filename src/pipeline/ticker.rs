//! Fixed-rate scheduling for the render loop.

use std::thread;
use std::time::{Duration, Instant};

/// Fixed-rate tick source for a loop running on one thread.
///
/// Ticks are never re-entrant: the caller does its work, then calls
/// [`Ticker::wait`] for the next slot. If the work overran one or more
/// periods, the missed ticks are skipped rather than fired back to back.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    /// The first tick is due immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next tick is due.
    pub fn due_in(&self) -> Duration {
        self.next.saturating_duration_since(Instant::now())
    }

    /// Sleep until the next tick is due, then schedule the one after it.
    pub fn wait(&mut self) {
        let remaining = self.due_in();
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }

        let now = Instant::now();
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_immediate() {
        let ticker = Ticker::new(Duration::from_millis(50));
        assert!(ticker.due_in().is_zero());
    }

    #[test]
    fn test_ticks_are_spaced_by_interval() {
        let mut ticker = Ticker::new(Duration::from_millis(5));
        let start = Instant::now();
        for _ in 0..4 {
            ticker.wait();
        }
        // first wait is immediate, the next three each take one interval
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_missed_ticks_are_skipped() {
        let mut ticker = Ticker::new(Duration::from_millis(50));
        ticker.wait();
        thread::sleep(Duration::from_millis(200));

        // overran several periods: this tick fires at once, the next one is
        // a full interval away instead of a burst of catch-up ticks
        let start = Instant::now();
        ticker.wait();
        assert!(start.elapsed() < Duration::from_millis(50));
        assert!(ticker.due_in() > Duration::ZERO);
    }
}
