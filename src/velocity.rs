//! Acceleration model for continuous wheel scrolling.
//!
//! Rapid same-direction detents accelerate: `speed = clamp(180e6 / dt_ns, 1, 40)`
//! and the step is `floor(speed^1.8)`. A direction change, or the first detent
//! since the tracker was created, steps by exactly one.

use std::time::Instant;

use crate::event::Direction;

/// Numerator of the speed estimate, in nanoseconds.
const SPEED_DIVISOR_NS: f64 = 180e6;
const MIN_SPEED: f64 = 1.0;
const MAX_SPEED: f64 = 40.0;
const ACCEL_EXPONENT: f64 = 1.8;

/// Last detent seen by the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LastDetent {
    at: Instant,
    direction: Direction,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VelocityTracker {
    last: Option<LastDetent>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a detent at `now` and return its step size (always `>= 1`).
    pub fn step(&mut self, now: Instant, direction: Direction) -> i64 {
        let step = match self.last {
            Some(last) if last.direction == direction => {
                let diff_ns = now.saturating_duration_since(last.at).as_nanos() as f64;
                step_for_interval(diff_ns)
            }
            _ => 1,
        };
        self.last = Some(LastDetent { at: now, direction });
        step
    }
}

/// Step size for two same-direction detents `diff_ns` apart.
pub fn step_for_interval(diff_ns: f64) -> i64 {
    // diff of zero divides to +inf, which clamps to MAX_SPEED.
    let speed = (SPEED_DIVISOR_NS / diff_ns).clamp(MIN_SPEED, MAX_SPEED);
    speed.powf(ACCEL_EXPONENT).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_detent_steps_by_one() {
        let mut tracker = VelocityTracker::new();
        assert_eq!(tracker.step(Instant::now(), Direction::Positive), 1);
    }

    #[test]
    fn fast_repeat_clamps_to_max_speed() {
        let t0 = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.step(t0, Direction::Positive);
        // 180e6 / 4.5e6 = 40 -> floor(40^1.8)
        let step = tracker.step(t0 + Duration::from_nanos(4_500_000), Direction::Positive);
        assert_eq!(step, 765);
        // Anything faster stays clamped.
        assert_eq!(step_for_interval(1.0), 765);
        assert_eq!(step_for_interval(0.0), 765);
    }

    #[test]
    fn moderate_repeat_accelerates() {
        // 180e6 / 90e6 = 2 -> floor(2^1.8) = 3
        assert_eq!(step_for_interval(90e6), 3);
        // 180e6 / 60e6 = 3 -> floor(3^1.8) = 7
        assert_eq!(step_for_interval(60e6), 7);
    }

    #[test]
    fn long_pause_clamps_to_min_speed() {
        let t0 = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.step(t0, Direction::Negative);
        let step = tracker.step(t0 + Duration::from_secs(1000), Direction::Negative);
        assert_eq!(step, 1);
    }

    #[test]
    fn reversal_resets_step() {
        let t0 = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.step(t0, Direction::Positive);
        let fast = tracker.step(t0 + Duration::from_millis(5), Direction::Positive);
        assert!(fast > 1);
        let reversed = tracker.step(t0 + Duration::from_millis(6), Direction::Negative);
        assert_eq!(reversed, 1);
    }

    #[test]
    fn timestamp_advances_on_every_detent() {
        let t0 = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.step(t0, Direction::Positive);
        tracker.step(t0 + Duration::from_secs(10), Direction::Negative);
        // Measured from the reversal, not from t0.
        let step = tracker.step(
            t0 + Duration::from_secs(10) + Duration::from_millis(60),
            Direction::Negative,
        );
        assert_eq!(step, 7);
    }
}
