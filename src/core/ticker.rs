//! Fixed-period tick source for the queue drain loop.
//!
//! egui has no timers; the update loop runs whenever something repaints. The
//! ticker turns that irregular stream of updates into an at-most-once-per-
//! period pulse, which is what drives `PrefetchQueue::drain_into`.

use std::time::{Duration, Instant};

pub const DEFAULT_DRAIN_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone)]
pub struct IntervalTicker {
    period: Duration,
    last: Option<Instant>,
}

impl Default for IntervalTicker {
    fn default() -> Self {
        Self::new(DEFAULT_DRAIN_INTERVAL_MS)
    }
}

impl IntervalTicker {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period: Duration::from_millis(period_ms),
            last: None,
        }
    }

    pub fn set_period(&mut self, period_ms: u64) {
        self.period = Duration::from_millis(period_ms);
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns true when a full period has elapsed since the last firing.
    /// The first call always fires.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_fires() {
        let mut ticker = IntervalTicker::new(50);
        assert!(ticker.tick());
    }

    #[test]
    fn does_not_fire_within_period() {
        let mut ticker = IntervalTicker::new(100);
        assert!(ticker.tick());
        assert!(!ticker.tick());
    }

    #[test]
    fn fires_after_period_elapses() {
        let mut ticker = IntervalTicker::new(10);
        assert!(ticker.tick());
        std::thread::sleep(Duration::from_millis(15));
        assert!(ticker.tick());
    }
}
