//! Sleep and jitter implementations used by the retry loop.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{BackoffJitter, RetrySleeper};

/// Runtime helpers used by the retry loop.
pub struct IndexSyncWorkerRuntime {
    /// Async sleep implementation.
    pub sleeper: Arc<dyn RetrySleeper>,
    /// Jitter strategy for retry delays.
    pub jitter: Arc<dyn BackoffJitter>,
}

impl Default for IndexSyncWorkerRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(RandomJitter::from_entropy()),
        }
    }
}

/// Tokio-based sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Adds a uniformly random extra delay of up to a quarter of the base delay.
pub struct RandomJitter {
    rng: Mutex<SmallRng>,
}

impl RandomJitter {
    /// Seed from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// Seed deterministically.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl BackoffJitter for RandomJitter {
    fn jittered_delay(&self, base: Duration, _attempt: u32) -> Duration {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let max_extra = base_ms / 4;
        let extra = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..=max_extra),
            // A poisoned generator still yields a usable, un-jittered delay.
            Err(_) => 0,
        };
        Duration::from_millis(base_ms.saturating_add(extra))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(200)]
    #[case(5_000)]
    fn jitter_stays_within_a_quarter_of_base(#[case] base_ms: u64) {
        let jitter = RandomJitter::seeded(7);
        let base = Duration::from_millis(base_ms);
        for attempt in 1..=20 {
            let delay = jitter.jittered_delay(base, attempt);
            assert!(delay >= base);
            assert!(delay <= base + Duration::from_millis(base_ms / 4));
        }
    }
}
