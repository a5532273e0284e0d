//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map pipeline and control errors to HTTP status codes
//! - Render every error as a JSON `{"error": ...}` body
//!
//! # Design Decisions
//! - Rate-limit rejections return 429 Too Many Requests
//! - Deadline expiry returns 504 Gateway Timeout
//! - Upstream failures return 502 Bad Gateway
//! - Malformed or invalid control payloads return 400 Bad Request

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ValidationError;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("invalid payload: {0}")]
    BadPayload(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Validation(_) | ApiError::BadPayload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
