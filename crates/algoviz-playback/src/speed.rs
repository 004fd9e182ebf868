//! Live-adjustable step cadence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

/// Steps per second used when nothing else is configured.
pub const DEFAULT_SPEED: f64 = 5.0;

/// Slowest accepted speed: one step every 100 seconds.
pub const MIN_SPEED: f64 = 0.01;

/// Fastest accepted speed: one step per millisecond.
pub const MAX_SPEED: f64 = 1000.0;

/// Source of the wait between two steps.
///
/// Consulted again before every wait, so a change takes effect at the next
/// step boundary.
pub trait IntervalProvider: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

impl<F> IntervalProvider for F
where
    F: Fn() -> Duration + Send + Sync + 'static,
{
    fn interval(&self) -> Duration {
        self()
    }
}

/// Reject speeds outside `MIN_SPEED..=MAX_SPEED`, including NaN.
pub fn validate_speed(speed: f64) -> Result<f64> {
    if (MIN_SPEED..=MAX_SPEED).contains(&speed) {
        Ok(speed)
    } else {
        Err(Error::InvalidSpeed(speed))
    }
}

/// Shared speed setting in steps per second.
///
/// Clones share the same value, so a UI can hold one clone while a running
/// playback reads another.
#[derive(Debug, Clone)]
pub struct SpeedControl {
    bits: Arc<AtomicU64>,
}

impl SpeedControl {
    pub fn new(speed: f64) -> Result<Self> {
        let speed = validate_speed(speed)?;
        Ok(Self {
            bits: Arc::new(AtomicU64::new(speed.to_bits())),
        })
    }

    pub fn speed(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Change the speed. Invalid values leave the current speed in place.
    pub fn set_speed(&self, speed: f64) -> Result<()> {
        let speed = validate_speed(speed)?;
        self.bits.store(speed.to_bits(), Ordering::Relaxed);
        Ok(())
    }
}

impl Default for SpeedControl {
    fn default() -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(DEFAULT_SPEED.to_bits())),
        }
    }
}

impl IntervalProvider for SpeedControl {
    /// `1 / speed` seconds.
    fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.speed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_200ms() {
        assert_eq!(SpeedControl::default().interval(), Duration::from_millis(200));
    }

    #[test]
    fn clones_share_the_setting() {
        let speed = SpeedControl::new(1.0).unwrap();
        let reader = speed.clone();
        speed.set_speed(4.0).unwrap();
        assert_eq!(reader.interval(), Duration::from_millis(250));
    }

    #[test]
    fn rejects_non_positive_speeds() {
        let speed = SpeedControl::default();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-20, f64::MIN_POSITIVE, 1e6] {
            assert!(matches!(speed.set_speed(bad), Err(Error::InvalidSpeed(_))));
        }
        assert_eq!(speed.speed(), DEFAULT_SPEED);
        assert!(SpeedControl::new(0.0).is_err());
    }

    #[test]
    fn bounds_give_finite_intervals() {
        let slow = SpeedControl::new(MIN_SPEED).unwrap();
        assert_eq!(slow.interval(), Duration::from_secs(100));
        let fast = SpeedControl::new(MAX_SPEED).unwrap();
        assert_eq!(fast.interval(), Duration::from_millis(1));
    }

    #[test]
    fn closures_provide_intervals() {
        let fixed = || Duration::from_millis(10);
        assert_eq!(fixed.interval(), Duration::from_millis(10));
    }
}
