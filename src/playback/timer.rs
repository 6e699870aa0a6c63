use std::time::{Duration, Instant};

/// Cooperative repeating timer polled from the UI loop.
///
/// The controller owns one and cancels it on every transition out of
/// playing, so no tick can fire after a pause or stop.
#[derive(Clone, Debug)]
pub struct ProgressTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl ProgressTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Arm the timer; the first tick is one interval after `now`
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// True when a tick is due at `now`; re-arms for the next one.
    /// Missed ticks collapse into one.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time until the next tick, for scheduling a repaint
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_interval() {
        let start = Instant::now();
        let mut timer = ProgressTimer::new(Duration::from_millis(100));
        timer.start(start);

        assert!(!timer.fire(start));
        assert!(!timer.fire(start + Duration::from_millis(99)));
        assert!(timer.fire(start + Duration::from_millis(100)));
        assert!(!timer.fire(start + Duration::from_millis(150)));
        // a long stall produces a single tick
        assert!(timer.fire(start + Duration::from_millis(900)));
        assert!(!timer.fire(start + Duration::from_millis(950)));
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let start = Instant::now();
        let mut timer = ProgressTimer::new(Duration::from_millis(100));
        assert_eq!(timer.remaining(start), None);
        timer.start(start);
        assert_eq!(timer.remaining(start), Some(Duration::from_millis(100)));
        timer.cancel();
        assert!(!timer.fire(start + Duration::from_secs(10)));
        assert_eq!(timer.remaining(start), None);
    }
}
