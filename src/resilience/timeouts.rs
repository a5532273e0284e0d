//! Per-request deadline scopes.
//!
//! # Responsibilities
//! - Open a bounded-time scope for each admitted request
//! - Hand downstream stages a cloneable expiry signal
//! - Close the scope on every exit path, including panics and dropped futures
//!
//! # States
//! ```text
//! Open → Expired: deadline elapsed before close()
//! Open → Closed:  close() called (or scope dropped) before the deadline
//! ```
//! Both transitions are one-shot. A closed scope never fires, even when its
//! deadline had already passed by the time anyone looked.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::config::DeadlineConfig;
use crate::control::cell::ConfigCell;

const OPEN: u8 = 0;
const EXPIRED: u8 = 1;
const CLOSED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Open,
    Expired,
    Closed,
}

#[derive(Debug)]
struct ScopeInner {
    deadline: Option<Instant>,
    state: AtomicU8,
    closed: Notify,
}

impl ScopeInner {
    fn state(&self) -> ScopeState {
        match self.state.load(Ordering::Acquire) {
            OPEN => ScopeState::Open,
            EXPIRED => ScopeState::Expired,
            _ => ScopeState::Closed,
        }
    }

    /// Move to Expired. Returns true if the scope is expired afterwards.
    fn fire(&self) -> bool {
        match self
            .state
            .compare_exchange(OPEN, EXPIRED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(current) => current == EXPIRED,
        }
    }

    fn close(&self) {
        if self
            .state
            .compare_exchange(OPEN, CLOSED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.closed.notify_waiters();
        }
    }
}

/// Owning side of a deadline. Closed explicitly or on drop.
#[derive(Debug)]
pub struct DeadlineScope {
    inner: Arc<ScopeInner>,
}

impl DeadlineScope {
    /// Open a scope that expires `timeout` from now. `None` never expires.
    pub fn open(timeout: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                deadline: timeout.map(|t| Instant::now() + t),
                state: AtomicU8::new(OPEN),
                closed: Notify::new(),
            }),
        }
    }

    pub fn disabled() -> Self {
        Self::open(None)
    }

    pub fn signal(&self) -> ScopeSignal {
        ScopeSignal {
            inner: self.inner.clone(),
        }
    }

    pub fn state(&self) -> ScopeState {
        self.inner.state()
    }

    /// Close the scope and return the state it ended in.
    ///
    /// Idempotent. Only an expiry already observed through the signal is
    /// reported as `Expired`; a due but unobserved deadline never fires.
    pub fn close(&self) -> ScopeState {
        self.inner.close();
        self.inner.state()
    }
}

impl Drop for DeadlineScope {
    fn drop(&mut self) {
        self.inner.close();
    }
}

/// Observing side of a deadline, passed down the pipeline.
#[derive(Debug, Clone)]
pub struct ScopeSignal {
    inner: Arc<ScopeInner>,
}

impl ScopeSignal {
    /// A signal that never fires, for handlers running outside a scope.
    pub fn never() -> Self {
        DeadlineScope::disabled().signal()
    }

    /// Non-blocking check.
    pub fn is_expired(&self) -> bool {
        match self.inner.state() {
            ScopeState::Expired => true,
            ScopeState::Closed => false,
            ScopeState::Open => {
                self.inner
                    .deadline
                    .is_some_and(|deadline| Instant::now() >= deadline)
                    && self.inner.fire()
            }
        }
    }

    /// Time left before expiry, `None` when the scope has no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Resolves when the scope expires. Pends forever if it never will.
    pub async fn expired(&self) {
        let Some(deadline) = self.inner.deadline else {
            return std::future::pending().await;
        };

        let closed = self.inner.closed.notified();
        tokio::pin!(closed);
        closed.as_mut().enable();

        match self.inner.state() {
            ScopeState::Expired => return,
            ScopeState::Closed => return std::future::pending().await,
            ScopeState::Open => {}
        }

        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                if self.inner.fire() {
                    return;
                }
            }
            _ = &mut closed => {}
        }

        // Closed first: drop the timer and never fire.
        std::future::pending().await
    }
}

/// Opens scopes from the current deadline snapshot.
#[derive(Debug)]
pub struct Deadlines {
    limits: Arc<ConfigCell<DeadlineConfig>>,
}

impl Deadlines {
    pub fn new(limits: Arc<ConfigCell<DeadlineConfig>>) -> Self {
        Self { limits }
    }

    pub fn open(&self) -> DeadlineScope {
        DeadlineScope::open(self.limits.get().value.timeout())
    }
}

/// Second pipeline stage: run the rest of the request inside a deadline scope.
pub async fn deadline_middleware(
    State(deadlines): State<Arc<Deadlines>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let scope = deadlines.open();
    request.extensions_mut().insert(scope.signal());

    let response = next.run(request).await;

    let state = scope.close();
    tracing::debug!(state = ?state, "Deadline scope closed");
    response
}
