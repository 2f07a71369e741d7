// Frame clock adapter - Animation-frame ticks on the tokio timer

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::ports::FrameClockPort;

/// Fires roughly once per display refresh. Ticks follow a fixed schedule;
/// a caller that falls behind skips the missed frames instead of bursting.
#[derive(Debug)]
pub struct TickerFrameClock {
    period: Duration,
    // Created on the first tick so the clock can be built outside a runtime
    ticker: Mutex<Option<Interval>>,
}

impl TickerFrameClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            ticker: Mutex::new(None),
        }
    }

    /// Ticks at the given refresh rate
    pub fn with_refresh_rate(hz: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / hz.max(1) as f64))
    }

    pub fn interval(&self) -> Duration {
        self.period
    }
}

impl Default for TickerFrameClock {
    fn default() -> Self {
        Self::with_refresh_rate(60)
    }
}

#[async_trait]
impl FrameClockPort for TickerFrameClock {
    async fn next_frame(&self) {
        let mut ticker = self.ticker.lock().await;
        let ticker = ticker.get_or_insert_with(|| {
            let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        ticker.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_ticks_follow_the_period() {
        let clock = TickerFrameClock::new(Duration::from_millis(16));
        let start = Instant::now();
        clock.next_frame().await;
        assert_eq!(start.elapsed(), Duration::from_millis(16));
        clock.next_frame().await;
        assert_eq!(start.elapsed(), Duration::from_millis(32));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_slow_consumer_skips_missed_frames() {
        let clock = TickerFrameClock::new(Duration::from_millis(10));
        let start = Instant::now();
        clock.next_frame().await;

        tokio::time::sleep(Duration::from_millis(35)).await;
        // Late tick fires at once, then the schedule realigns to the period
        clock.next_frame().await;
        assert_eq!(start.elapsed(), Duration::from_millis(45));
        clock.next_frame().await;
        assert_eq!(start.elapsed(), Duration::from_millis(50));
    }

    #[test]
    fn test_builds_outside_a_runtime() {
        assert_eq!(TickerFrameClock::default().interval(), Duration::from_secs_f64(1.0 / 60.0));
    }
}
