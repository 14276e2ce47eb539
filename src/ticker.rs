use std::time::{Duration, Instant};

/// Fixed-period schedule driven by a monotonic clock.
///
/// A `Ticker` only exists while a countdown runs; dropping it is how the
/// periodic recompute is cancelled.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    pub fn start(period: Duration, now: Instant) -> Self {
        Self { period, next: now + period }
    }

    /// Returns `true` at most once per elapsed deadline. A loop that stalls
    /// for several periods fires once and resynchronises to `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }

        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }

    pub fn until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}
