use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ValidationError;

/// Pacing policy applied before each send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateMode {
    /// Fixed delay before every send.
    Stable(Duration),
    /// Delay drawn uniformly from `[low, high)` on every send.
    Random { low: Duration, high: Duration },
}

impl RateMode {
    /// Inverts a requests-per-second value into a stable per-request delay.
    ///
    /// # Errors
    ///
    /// Returns `RateMustBePositive` when `rps` is not a finite value > 0 or
    /// its inverse does not fit in a `Duration`.
    pub fn from_rps(rps: f64) -> Result<Self, ValidationError> {
        if !rps.is_finite() || rps <= 0.0 {
            return Err(ValidationError::RateMustBePositive { value: rps });
        }
        let interval = Duration::try_from_secs_f64(rps.recip())
            .map_err(|_overflow| ValidationError::RateMustBePositive { value: rps })?;
        Ok(RateMode::Stable(interval))
    }

    /// # Errors
    ///
    /// Returns `DelayRangeEmpty` when `low >= high`.
    pub fn random(low: Duration, high: Duration) -> Result<Self, ValidationError> {
        if low >= high {
            return Err(ValidationError::DelayRangeEmpty);
        }
        Ok(RateMode::Random { low, high })
    }
}

/// Reports the delay to apply before the next send. It never sleeps itself.
pub struct RateController {
    rng: StdRng,
}

impl RateController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic draws for `RateMode::Random`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn delay(&mut self, mode: &RateMode) -> Duration {
        match *mode {
            RateMode::Stable(interval) => interval,
            RateMode::Random { low, high } => {
                if low >= high {
                    return low;
                }
                self.rng.gen_range(low..high)
            }
        }
    }
}

impl Default for RateController {
    fn default() -> Self {
        Self::new()
    }
}
