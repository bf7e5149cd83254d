//! Shared virtual clock and the timer that paces it.
//!
//! All scheduling happens against [`Clock`] time in seconds. A [`Timer`]
//! decides whether advancing the clock also waits on the wall clock: the CLI
//! uses [`WallTimer`] so SLEEP and note timing are audible in real time, tests
//! use [`VirtualTimer`] so a minute of music runs instantly.

use std::thread;
use std::time::Duration;

use tracing::warn;

/// The sole suspension primitive available to interpreted code.
pub trait Timer {
    /// Block for `ms` milliseconds of wall time (or not at all).
    fn suspend(&mut self, ms: f64);
}

/// Never blocks; time passes only on the virtual clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct VirtualTimer;

impl Timer for VirtualTimer {
    fn suspend(&mut self, _ms: f64) {}
}

/// Blocks the calling thread for the requested duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallTimer;

impl Timer for WallTimer {
    fn suspend(&mut self, ms: f64) {
        if ms > 0.0 {
            match Duration::try_from_secs_f64(ms / 1000.0) {
                Ok(duration) => thread::sleep(duration),
                Err(err) => warn!(ms, %err, "suspend skipped"),
            }
        }
    }
}

/// Monotonic position on the shared timeline.
#[derive(Debug, Default, Clone)]
pub struct Clock {
    now: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move to `target` seconds, suspending on `timer` for the gap.
    /// Targets in the past are ignored.
    pub fn advance_to(&mut self, target: f64, timer: &mut dyn Timer) {
        if target > self.now {
            timer.suspend((target - self.now) * 1000.0);
            self.now = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// Records every suspension request.
    #[derive(Default)]
    struct Recorder(Vec<f64>);

    impl Timer for Recorder {
        fn suspend(&mut self, ms: f64) {
            self.0.push(ms);
        }
    }

    #[test]
    fn starts_at_zero() {
        assert_eq!(Clock::new().now(), 0.0);
    }

    #[test]
    fn advance_suspends_for_gap() {
        let mut clock = Clock::new();
        let mut timer = Recorder::default();
        clock.advance_to(0.5, &mut timer);
        clock.advance_to(1.25, &mut timer);
        assert_approx_eq!(clock.now(), 1.25);
        assert_eq!(timer.0.len(), 2);
        assert_approx_eq!(timer.0[0], 500.0);
        assert_approx_eq!(timer.0[1], 750.0);
    }

    #[test]
    fn never_moves_backwards() {
        let mut clock = Clock::new();
        let mut timer = Recorder::default();
        clock.advance_to(2.0, &mut timer);
        clock.advance_to(1.0, &mut timer);
        assert_approx_eq!(clock.now(), 2.0);
        assert_eq!(timer.0.len(), 1);
    }

    #[test]
    fn wall_timer_skips_unrepresentable_waits() {
        let start = std::time::Instant::now();
        WallTimer.suspend(f64::INFINITY);
        WallTimer.suspend(1e30);
        WallTimer.suspend(f64::NAN);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn virtual_timer_is_instant() {
        let start = std::time::Instant::now();
        let mut clock = Clock::new();
        clock.advance_to(60.0, &mut VirtualTimer);
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_approx_eq!(clock.now(), 60.0);
    }
}
