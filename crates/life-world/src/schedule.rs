//! Clocks and periodic tasks.
//!
//! Time is a `Duration` measured from the clock's origin, so the scheduler
//! works the same against wall time and against a test clock that is
//! advanced by hand.

use std::cell::Cell;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Real monotonic time, starting at construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The wall-clock instant `offset` after the origin
    pub fn instant_at(&self, offset: Duration) -> Instant {
        self.origin + offset
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// How a task picks its next due time after running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Previous due time plus the period; late runs do not shift the schedule
    FixedRate,
    /// Time the run happened plus the period; lateness accumulates as drift
    SelfRescheduling,
}

#[derive(Debug, Clone)]
pub struct PeriodicTask {
    period: Duration,
    cadence: Cadence,
    next_due: Duration,
    runs: u64,
}

impl PeriodicTask {
    /// First run is due one period after `start`
    pub fn new(period: Duration, cadence: Cadence, start: Duration) -> Self {
        Self {
            period,
            cadence,
            next_due: start + period,
            runs: 0,
        }
    }

    pub fn is_due(&self, now: Duration) -> bool {
        self.next_due <= now
    }

    pub fn next_due(&self) -> Duration {
        self.next_due
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Record a run that happened at `ran_at` and schedule the next one
    pub fn complete(&mut self, ran_at: Duration) {
        self.runs += 1;
        self.next_due = match self.cadence {
            Cadence::FixedRate => self.next_due + self.period,
            Cadence::SelfRescheduling => ran_at + self.period,
        };
    }

    /// Start over as if created at `start`
    pub fn restart(&mut self, start: Duration) {
        self.next_due = start + self.period;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.advance(100 * MS);
        clock.advance(100 * MS);
        assert_eq!(clock.now(), 200 * MS);
        clock.set(5 * MS);
        assert_eq!(clock.now(), 5 * MS);
    }

    #[test]
    fn test_first_run_after_one_period() {
        let task = PeriodicTask::new(100 * MS, Cadence::FixedRate, Duration::ZERO);
        assert!(!task.is_due(99 * MS));
        assert!(task.is_due(100 * MS));
    }

    #[test]
    fn test_fixed_rate_ignores_lateness() {
        let mut task = PeriodicTask::new(100 * MS, Cadence::FixedRate, Duration::ZERO);
        task.complete(130 * MS);
        assert_eq!(task.next_due(), 200 * MS);
        assert_eq!(task.runs(), 1);
    }

    #[test]
    fn test_self_rescheduling_drifts() {
        let mut task = PeriodicTask::new(
            Duration::from_secs(10),
            Cadence::SelfRescheduling,
            Duration::ZERO,
        );
        task.complete(Duration::from_millis(10_250));
        assert_eq!(task.next_due(), Duration::from_millis(20_250));
    }

    #[test]
    fn test_restart() {
        let mut task = PeriodicTask::new(100 * MS, Cadence::FixedRate, Duration::ZERO);
        task.complete(100 * MS);
        task.restart(Duration::from_secs(30));
        assert_eq!(task.next_due(), Duration::from_secs(30) + 100 * MS);
    }

    #[test]
    fn test_monotonic_clock_moves_forward() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(clock.instant_at(Duration::from_secs(1)) > clock.instant_at(Duration::ZERO));
    }
}
