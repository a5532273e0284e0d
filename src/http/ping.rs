//! The request path under test.
//!
//! # Pipeline
//! ```text
//! GET /ping
//!     → rate_limit_middleware (429 when the bucket is empty)
//!     → deadline_middleware   (opens the scope, closes it after the handler)
//!     → ping                  (injected delay, optional upstream, response)
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::request::request_id_of;
use crate::http::response::ApiError;
use crate::http::upstream::Upstream;
use crate::observability::metrics;
use crate::resilience::delay::{DelayInjector, WaitOutcome};
use crate::resilience::timeouts::ScopeSignal;

/// State for the terminal `/ping` handler.
#[derive(Debug, Clone)]
pub struct PingState {
    pub delays: Arc<DelayInjector>,
    pub upstream: Option<Upstream>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

pub async fn ping(
    State(state): State<PingState>,
    request: Request,
) -> Result<Json<PingResponse>, ApiError> {
    let start = Instant::now();
    let request_id = request_id_of(&request);
    let signal = request
        .extensions()
        .get::<ScopeSignal>()
        .cloned()
        .unwrap_or_else(ScopeSignal::never);

    let result = respond(&state, &signal).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(ApiError::DeadlineExceeded) => "timed_out",
        Err(_) => "failed",
    };
    metrics::record_ping(outcome, start.elapsed());

    match &result {
        Ok(_) => tracing::debug!(request_id = %request_id, "Ping served"),
        Err(e) => tracing::warn!(request_id = %request_id, error = %e, "Ping failed"),
    }
    result.map(Json)
}

async fn respond(state: &PingState, signal: &ScopeSignal) -> Result<PingResponse, ApiError> {
    if state.delays.wait(signal).await == WaitOutcome::Interrupted {
        return Err(ApiError::DeadlineExceeded);
    }

    let Some(upstream) = &state.upstream else {
        return Ok(PingResponse {
            message: "pong".to_string(),
        });
    };

    tokio::select! {
        biased;
        _ = signal.expired() => Err(ApiError::DeadlineExceeded),
        result = upstream.fetch() => match result {
            Ok(body) => Ok(PingResponse { message: body }),
            Err(e) => {
                tracing::error!(url = %upstream.url(), error = %e, "Upstream error");
                Err(ApiError::Upstream(e.to_string()))
            }
        },
    }
}
