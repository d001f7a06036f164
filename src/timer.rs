use std::time::{Duration, Instant};

const TIMER_DEC_PER_SECOND: u64 = 60;
pub const TIMER_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / TIMER_DEC_PER_SECOND);

/// Wall-clock driver for the delay and sound timers.
///
/// The clock does not own the timers themselves, it only answers how many 60 Hz
/// periods have gone by. Leftover time that does not fill a period is carried
/// into the next call.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    last_updated: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self { last_updated: None }
    }

    /// Forget any elapsed time. The next `sync` counts from `now`.
    pub fn rebaseline(&mut self, now: Instant) {
        self.last_updated = Some(now);
    }

    /// Drop the baseline entirely; the first `sync` afterwards only sets it.
    pub fn reset(&mut self) {
        self.last_updated = None;
    }

    /// Whole periods elapsed between the baseline and `now`.
    pub fn sync(&mut self, now: Instant) -> u32 {
        let Some(last_updated) = self.last_updated else {
            self.last_updated = Some(now);
            return 0;
        };

        let elapsed = now.saturating_duration_since(last_updated);
        let periods = (elapsed.as_nanos() / TIMER_PERIOD.as_nanos()).min(u32::MAX as u128) as u32;
        if periods > 0 {
            self.last_updated = Some(last_updated + TIMER_PERIOD * periods);
        }
        periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sync_only_sets_baseline() {
        let mut timer = Timer::new();
        let start = Instant::now();
        assert_eq!(timer.sync(start + Duration::from_secs(5)), 0);
        assert_eq!(timer.sync(start + Duration::from_secs(6)), 60);
    }

    #[test]
    fn test_counts_whole_periods() {
        let mut timer = Timer::new();
        let start = Instant::now();
        timer.rebaseline(start);
        assert_eq!(timer.sync(start + Duration::from_millis(10)), 0);
        assert_eq!(timer.sync(start + Duration::from_millis(17)), 1);
        assert_eq!(timer.sync(start + Duration::from_millis(50)), 2);
        assert_eq!(timer.sync(start + Duration::from_secs(1)), 57);
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut timer = Timer::new();
        let start = Instant::now();
        timer.rebaseline(start);
        // 100 steps of 10ms are one second no matter how they are sliced
        let total: u32 = (1..=100)
            .map(|i| timer.sync(start + Duration::from_millis(10 * i)))
            .sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn test_rebaseline_discards_elapsed_time() {
        let mut timer = Timer::new();
        let start = Instant::now();
        timer.rebaseline(start);
        timer.rebaseline(start + Duration::from_secs(10));
        assert_eq!(timer.sync(start + Duration::from_secs(10)), 0);
        assert_eq!(timer.sync(start + Duration::from_millis(10_020)), 1);
    }

    #[test]
    fn test_clock_going_backwards_is_ignored() {
        let mut timer = Timer::new();
        let start = Instant::now() + Duration::from_secs(1);
        timer.rebaseline(start);
        assert_eq!(timer.sync(start - Duration::from_millis(500)), 0);
    }
}
