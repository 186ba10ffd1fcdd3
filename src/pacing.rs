//! Inter-request pacing policy
//!
//! After every network fetch the engine waits a randomized delay uniformly
//! distributed in `[min, max]`. The delay exists for politeness toward the
//! server, not as retry backoff. One policy value is shared read-only across
//! a batch run so every book paces identically.

use rand::Rng;
use std::time::Duration;

use crate::config::PrintConfig;

/// Randomized delay bounds between consecutive requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    min: Duration,
    max: Duration,
}

impl PacingPolicy {
    /// Build a policy from explicit millisecond bounds.
    ///
    /// Bounds are swap-normalized so `min <= max` always holds.
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        let (min_ms, max_ms) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };
        Self {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms),
        }
    }

    /// Build a policy from the configured pacing bounds
    #[must_use]
    pub fn from_config(config: &PrintConfig) -> Self {
        Self::new(config.min_page_delay_ms, config.max_page_delay_ms)
    }

    /// Sample a delay in `[min, max]`
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max > self.min {
            // Sample before sleeping; the thread-local RNG must not be held
            // across an await point.
            let ms = rand::rng().random_range(self.min.as_millis()..=self.max.as_millis());
            Duration::from_millis(ms as u64)
        } else {
            self.min
        }
    }

    /// Wait the sampled delay. A zero-width policy returns immediately.
    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
