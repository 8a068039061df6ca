//! Wall-clock accumulator for active dictation time.

use std::time::{Duration, Instant};

/// Tracks how long the dictation capability has actually been
/// recording. Accumulated time only ever grows, and only by the span
/// between a start and its matching stop.
///
/// Starting while already active is a no-op: the original start mark
/// is kept, so no elapsed time is lost or double-counted. Stopping
/// while idle is likewise a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MicTimer {
    active_since: Option<Instant>,
    accumulated: Duration,
}

impl MicTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    /// Zeroes the accumulator and drops any active mark.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active_since.is_some()
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Accumulated time rounded to the nearest whole minute. Save
    /// Minutes is only issued when this is at least 1.
    pub fn whole_minutes(&self) -> u64 {
        ((self.accumulated.as_millis() + 30_000) / 60_000) as u64
    }

    fn start_at(&mut self, now: Instant) {
        if self.active_since.is_none() {
            self.active_since = Some(now);
        }
    }

    fn stop_at(&mut self, now: Instant) {
        if let Some(started) = self.active_since.take() {
            self.accumulated += now.saturating_duration_since(started);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_pairs_accumulate_in_order() {
        let t0 = Instant::now();
        let mut timer = MicTimer::new();

        timer.start_at(t0);
        timer.stop_at(t0 + Duration::from_secs(10));
        assert_eq!(timer.accumulated(), Duration::from_secs(10));

        timer.start_at(t0 + Duration::from_secs(20));
        timer.stop_at(t0 + Duration::from_secs(25));
        assert_eq!(timer.accumulated(), Duration::from_secs(15));
    }

    #[test]
    fn unmatched_trailing_start_contributes_nothing() {
        let t0 = Instant::now();
        let mut timer = MicTimer::new();
        timer.start_at(t0);
        assert_eq!(timer.accumulated(), Duration::ZERO);
        assert!(timer.is_active());
    }

    #[test]
    fn start_while_active_keeps_the_original_mark() {
        let t0 = Instant::now();
        let mut timer = MicTimer::new();
        timer.start_at(t0);
        // A second start must not discard the time since t0.
        timer.start_at(t0 + Duration::from_secs(30));
        timer.stop_at(t0 + Duration::from_secs(60));
        assert_eq!(timer.accumulated(), Duration::from_secs(60));
    }

    #[test]
    fn stop_while_idle_is_a_no_op() {
        let t0 = Instant::now();
        let mut timer = MicTimer::new();
        timer.stop_at(t0);
        assert_eq!(timer.accumulated(), Duration::ZERO);

        timer.start_at(t0);
        timer.stop_at(t0 + Duration::from_secs(5));
        timer.stop_at(t0 + Duration::from_secs(50));
        assert_eq!(timer.accumulated(), Duration::from_secs(5));
    }

    #[test]
    fn reset_always_yields_a_zeroed_idle_timer() {
        let t0 = Instant::now();
        let mut timer = MicTimer::new();
        timer.start_at(t0);
        timer.stop_at(t0 + Duration::from_secs(90));
        timer.start_at(t0 + Duration::from_secs(100));
        timer.reset();
        assert_eq!(timer, MicTimer::default());
        assert!(!timer.is_active());
        assert_eq!(timer.accumulated(), Duration::ZERO);
    }

    #[test]
    fn whole_minutes_round_to_nearest() {
        let t0 = Instant::now();
        let mut timer = MicTimer::new();
        timer.start_at(t0);
        timer.stop_at(t0 + Duration::from_secs(29));
        assert_eq!(timer.whole_minutes(), 0);

        timer.start_at(t0 + Duration::from_secs(100));
        timer.stop_at(t0 + Duration::from_secs(101));
        assert_eq!(timer.whole_minutes(), 1); // 30s rounds up

        timer.reset();
        timer.start_at(t0);
        timer.stop_at(t0 + Duration::from_secs(150));
        assert_eq!(timer.whole_minutes(), 3); // 2m30s rounds up
    }
}
