//! Repeating interval timer
//!
//! A [`Cadence`] is polled from the per-frame update with the current time
//! and yields each scheduled tick instant that has come due, in order. Ticks
//! missed during a stall are all delivered on the next poll.

use std::time::Duration;

/// Repeating tick schedule with cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    period: Duration,
    next_due: Option<Duration>,
}

impl Cadence {
    /// Cadence firing `hz` times per second, not yet armed
    ///
    /// Non-positive or non-finite rates, and rates too slow for the period to
    /// fit in a [`Duration`], fall back to one tick per second.
    pub fn from_hz(hz: f32) -> Self {
        let period = if hz.is_finite() && hz > 0.0 {
            Duration::try_from_secs_f32(1.0 / hz).unwrap_or(Duration::from_secs(1))
        } else {
            Duration::from_secs(1)
        };
        Self::with_period(period)
    }

    /// Cadence with an explicit period, not yet armed
    pub fn with_period(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_micros(1)),
            next_due: None,
        }
    }

    /// Interval between ticks
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking; the first tick is due at `now`
    pub fn arm(&mut self, now: Duration) {
        self.next_due = Some(now);
    }

    /// Stop ticking
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Whether ticks are scheduled
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Instant of the next scheduled tick
    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    /// Take the earliest tick due at or before `now`, scheduling the next one
    pub fn poll(&mut self, now: Duration) -> Option<Duration> {
        let due = self.next_due?;
        if due > now {
            return None;
        }
        self.next_due = Some(due + self.period);
        Some(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_immediate() {
        let mut cadence = Cadence::from_hz(2.0);
        assert_eq!(cadence.poll(Duration::ZERO), None);

        cadence.arm(Duration::from_secs(1));
        assert_eq!(cadence.poll(Duration::from_secs(1)), Some(Duration::from_secs(1)));
        assert_eq!(cadence.poll(Duration::from_secs(1)), None);
        assert_eq!(
            cadence.poll(Duration::from_millis(1500)),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_stall_delivers_all_due_ticks() {
        let mut cadence = Cadence::from_hz(4.0);
        cadence.arm(Duration::ZERO);
        let mut ticks = Vec::new();
        while let Some(t) = cadence.poll(Duration::from_millis(1000)) {
            ticks.push(t.as_millis());
        }
        assert_eq!(ticks, vec![0, 250, 500, 750, 1000]);
    }

    #[test]
    fn test_cancel() {
        let mut cadence = Cadence::from_hz(10.0);
        cadence.arm(Duration::ZERO);
        assert!(cadence.is_armed());
        cadence.cancel();
        assert!(!cadence.is_armed());
        assert_eq!(cadence.poll(Duration::from_secs(5)), None);
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        assert_eq!(Cadence::from_hz(0.0).period(), Duration::from_secs(1));
        assert_eq!(Cadence::from_hz(f32::NAN).period(), Duration::from_secs(1));
        assert_eq!(Cadence::from_hz(1e-30).period(), Duration::from_secs(1));
        assert_eq!(Cadence::from_hz(-4.0).period(), Duration::from_secs(1));
    }
}
