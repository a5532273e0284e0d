//! Injected backend latency.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DelayConfig;
use crate::control::cell::ConfigCell;
use crate::resilience::timeouts::ScopeSignal;

/// How a delay ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full delay elapsed.
    Completed,
    /// The scope expired first.
    Interrupted,
}

/// Pick the concrete delay for one request.
///
/// Uniform in `[minimum, maximum)`; exactly `minimum` for the fixed form.
pub fn draw_delay<R: Rng + ?Sized>(config: &DelayConfig, rng: &mut R) -> Duration {
    let delay_ms = if config.maximum_ms > config.minimum_ms {
        rng.gen_range(config.minimum_ms..config.maximum_ms)
    } else {
        config.minimum_ms
    };
    Duration::from_millis(delay_ms)
}

/// Sleep for `delay` unless `signal` fires first.
///
/// When both resolve together the expiry wins.
pub async fn race(delay: Duration, signal: &ScopeSignal) -> WaitOutcome {
    tokio::select! {
        biased;
        _ = signal.expired() => WaitOutcome::Interrupted,
        _ = tokio::time::sleep(delay) => WaitOutcome::Completed,
    }
}

/// Suspends each request for a duration drawn from the current delay snapshot.
#[derive(Debug)]
pub struct DelayInjector {
    delays: Arc<ConfigCell<DelayConfig>>,
    rng: Mutex<StdRng>,
}

impl DelayInjector {
    pub fn new(delays: Arc<ConfigCell<DelayConfig>>) -> Self {
        Self {
            delays,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic draws, for tests and reproducible runs.
    pub fn with_seed(delays: Arc<ConfigCell<DelayConfig>>, seed: u64) -> Self {
        Self {
            delays,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Read the delay snapshot once and draw this request's delay.
    pub fn next_delay(&self) -> Duration {
        let snapshot = self.delays.get();
        let mut rng = self.rng.lock().expect("delay rng mutex poisoned");
        draw_delay(&snapshot.value, &mut *rng)
    }

    pub async fn wait(&self, signal: &ScopeSignal) -> WaitOutcome {
        let delay = self.next_delay();
        let outcome = race(delay, signal).await;
        tracing::debug!(delay = ?delay, outcome = ?outcome, "Injected delay finished");
        outcome
    }
}
