//! Token bucket admission gate.

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::time::Instant;

use crate::config::RateLimitConfig;
use crate::control::cell::ConfigCell;
use crate::http::request::request_id_of;
use crate::http::response::ApiError;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Bucket tied to the configuration version it was built for.
#[derive(Debug)]
struct VersionedBucket {
    version: u64,
    bucket: TokenBucket,
}

/// Admission control shared by every `/ping` request.
///
/// Reads the current [`RateLimitConfig`] snapshot on each call. A bucket is
/// only kept for the snapshot version it was created under: any update,
/// including disabling and re-enabling, starts from a fresh full bucket.
#[derive(Debug)]
pub struct RateGate {
    limits: Arc<ConfigCell<RateLimitConfig>>,
    bucket: Mutex<Option<VersionedBucket>>,
}

impl RateGate {
    pub fn new(limits: Arc<ConfigCell<RateLimitConfig>>) -> Self {
        Self {
            limits,
            bucket: Mutex::new(None),
        }
    }

    /// Try to admit one request. Never blocks on time; rejection is immediate.
    pub fn admit(&self) -> bool {
        let mut slot = self.bucket.lock().expect("rate gate mutex poisoned");

        // Loaded under the lock so versions seen by the bucket never go backwards.
        let snapshot = self.limits.get();
        let config = snapshot.value;
        if !config.is_enabled() {
            *slot = None;
            return true;
        }

        let capacity = f64::from(config.burst);
        if slot.as_ref().is_some_and(|entry| entry.version < snapshot.version) {
            *slot = None;
        }
        let entry = slot.get_or_insert_with(|| VersionedBucket {
            version: snapshot.version,
            bucket: TokenBucket::new(capacity),
        });
        entry.bucket.try_acquire(capacity, config.rate)
    }
}

/// First pipeline stage: reject with 429 when the gate is closed.
pub async fn rate_limit_middleware(
    State(gate): State<Arc<RateGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if gate.admit() {
        return next.run(request).await;
    }

    let request_id = request_id_of(&request);
    tracing::warn!(request_id = %request_id, "Rate limit exceeded");
    metrics::record_ping("rejected", std::time::Duration::ZERO);
    ApiError::RateLimited.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gate(rate: f64, burst: u32) -> (Arc<ConfigCell<RateLimitConfig>>, RateGate) {
        let cell = Arc::new(ConfigCell::new(RateLimitConfig { rate, burst }));
        let gate = RateGate::new(cell.clone());
        (cell, gate)
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_gate_always_admits() {
        let (_, gate) = gate(0.0, 1);
        assert!((0..10_000).all(|_| gate.admit()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_bounds_immediate_admissions() {
        for burst in [1u32, 2, 5, 17] {
            let (_, gate) = gate(1.0, burst);
            for _ in 0..burst {
                assert!(gate.admit());
            }
            assert!(!gate.admit(), "call {} should be rejected", burst + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_refill_at_rate() {
        let (_, gate) = gate(10.0, 1);
        assert!(gate.admit());
        assert!(!gate.admit());

        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(!gate.admit());

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(gate.admit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_is_capped_at_burst() {
        let (_, gate) = gate(100.0, 3);
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!((0..10).filter(|_| gate.admit()).count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_then_reenable_starts_fresh() {
        let (cell, gate) = gate(1.0, 1);
        assert!(gate.admit());
        assert!(!gate.admit());

        cell.update(RateLimitConfig { rate: 0.0, burst: 1 }).unwrap();
        assert!((0..100).all(|_| gate.admit()));

        cell.update(RateLimitConfig { rate: 1.0, burst: 1 }).unwrap();
        assert!(gate.admit());
        assert!(!gate.admit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfiguration_applies_to_next_call() {
        let (cell, gate) = gate(1.0, 1);
        assert!(gate.admit());
        assert!(!gate.admit());

        cell.update(RateLimitConfig { rate: 1.0, burst: 4 }).unwrap();
        assert_eq!((0..10).filter(|_| gate.admit()).count(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admits_never_exceed_burst() {
        // A very slow refill keeps the bucket effectively static for the test.
        let (_, gate) = gate(0.001, 25);
        let gate = Arc::new(gate);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                tokio::spawn(async move { (0..50).filter(|_| gate.admit()).count() })
            })
            .collect();

        let mut admitted = 0;
        for task in tasks {
            admitted += task.await.unwrap();
        }
        assert_eq!(admitted, 25);
    }

    #[test]
    fn test_update_during_concurrent_admits_grants_one_fresh_bucket() {
        for _ in 0..20 {
            let (cell, gate) = gate(1e-9, 1);
            let gate = Arc::new(gate);
            let barrier = Arc::new(std::sync::Barrier::new(9));

            let workers: Vec<_> = (0..8)
                .map(|_| {
                    let gate = gate.clone();
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        (0..20_000).filter(|_| gate.admit()).count()
                    })
                })
                .collect();

            barrier.wait();
            std::thread::sleep(Duration::from_millis(1));
            cell.update(RateLimitConfig { rate: 1e-9, burst: 1 }).unwrap();

            let admitted: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
            assert!(
                (1..=2).contains(&admitted),
                "one bucket per version allows at most 2 admits, got {admitted}"
            );
        }
    }
}
