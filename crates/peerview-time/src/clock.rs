//! Clock implementations for the peer view monitors

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Phase-locked periodic tick source
///
/// Models both the display refresh signal driving the face detection loop
/// and the fixed resolution poll. Ticks fall on `origin + k * period`; the
/// first one is one full period after creation, never immediate.
/// INVARIANT: `tick()` always waits for a boundary strictly after now, so
/// ticks missed while the owner was busy are skipped, not replayed
pub struct RefreshClock {
    origin: Instant,
    period: Duration,
    ticks: u64,
}

impl RefreshClock {
    /// Create a clock ticking every `period`
    pub fn new(period: Duration) -> Self {
        RefreshClock {
            origin: Instant::now(),
            period: period.max(Duration::from_micros(1)),
            ticks: 0,
        }
    }

    /// Roughly 60 Hz display refresh
    pub fn display() -> Self {
        Self::new(Duration::from_millis(16))
    }

    /// Next tick boundary strictly after `now`
    pub fn next_boundary(&self, now: Instant) -> Instant {
        let elapsed = now.saturating_duration_since(self.origin).as_nanos();
        let period = self.period.as_nanos();
        let periods = elapsed / period + 1;
        self.origin + Duration::from_nanos((periods * period) as u64)
    }

    /// Wait for the next tick
    pub async fn tick(&mut self) -> Instant {
        let at = self.next_boundary(Instant::now());
        sleep_until(at).await;
        self.ticks += 1;
        at
    }

    /// Wait for the next tick, then an additional fixed delay
    pub async fn tick_then_sleep(&mut self, delay: Duration) {
        self.tick().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks observed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let start = Instant::now();
        let mut clock = RefreshClock::new(Duration::from_millis(1000));

        let at = clock.tick().await;
        assert_eq!(at - start, Duration::from_millis(1000));

        clock.tick().await;
        assert_eq!(Instant::now() - start, Duration::from_millis(2000));
        assert_eq!(clock.ticks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_then_sleep() {
        let start = Instant::now();
        let mut clock = RefreshClock::display();

        clock.tick_then_sleep(Duration::from_millis(100)).await;
        assert_eq!(Instant::now() - start, Duration::from_millis(116));

        // Busy past two boundaries: the next tick is the following boundary
        tokio::time::sleep(Duration::from_millis(30)).await;
        let at = clock.tick().await;
        assert_eq!(at - start, Duration::from_millis(160));
    }
}
