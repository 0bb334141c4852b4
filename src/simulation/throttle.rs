use super::ConfigError;
use std::thread;
use std::time::Duration;

/// Fixed-interval rate limiter: each `acquire` sleeps `1 / permits_per_second`.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval: Duration,
}

impl Throttle {
    /// A rate of 0 never sleeps.
    pub fn new(permits_per_second: f64) -> Result<Self, ConfigError> {
        if !permits_per_second.is_finite() || permits_per_second < 0.0 {
            return Err(ConfigError::InvalidRate(permits_per_second));
        }
        let interval = if permits_per_second == 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / permits_per_second)
        };
        Ok(Self { interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn acquire(&self) {
        if !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
    }
}
