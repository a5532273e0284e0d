use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::config::validation::{burst_from_wire, non_negative_millis};
use crate::config::{DeadlineConfig, DelayConfig, RateLimitConfig, ValidationError};
use crate::control::ControlPlane;
use crate::http::response::ApiError;
use crate::observability::metrics;

/// Wire form of the rate limit group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitBody {
    pub rate: f64,
    pub burst: i64,
}

impl From<&RateLimitConfig> for RateLimitBody {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            rate: config.rate,
            burst: i64::from(config.burst),
        }
    }
}

impl TryFrom<RateLimitBody> for RateLimitConfig {
    type Error = ValidationError;

    fn try_from(body: RateLimitBody) -> Result<Self, Self::Error> {
        Ok(Self {
            rate: body.rate,
            burst: burst_from_wire(body.burst)?,
        })
    }
}

/// Wire form of the deadline group, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLimitBody {
    pub time_limit: i64,
}

impl From<&DeadlineConfig> for TimeLimitBody {
    fn from(config: &DeadlineConfig) -> Self {
        Self {
            time_limit: i64::try_from(config.timeout_ms).unwrap_or(i64::MAX),
        }
    }
}

impl TryFrom<TimeLimitBody> for DeadlineConfig {
    type Error = ValidationError;

    fn try_from(body: TimeLimitBody) -> Result<Self, Self::Error> {
        Ok(Self::from_millis(non_negative_millis("timeLimit", body.time_limit)?))
    }
}

/// Wire form of the delay group, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayBody {
    pub minimum_delay: i64,
    pub maximum_delay: i64,
}

impl From<&DelayConfig> for DelayBody {
    fn from(config: &DelayConfig) -> Self {
        Self {
            minimum_delay: i64::try_from(config.minimum_ms).unwrap_or(i64::MAX),
            maximum_delay: i64::try_from(config.maximum_ms).unwrap_or(i64::MAX),
        }
    }
}

/// Accepted bodies for `PUT /delay`: either bounds or a single fixed delay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DelayUpdate {
    Range(DelayBody),
    Fixed { delay: i64 },
}

impl TryFrom<DelayUpdate> for DelayConfig {
    type Error = ValidationError;

    fn try_from(update: DelayUpdate) -> Result<Self, Self::Error> {
        match update {
            DelayUpdate::Range(body) => Ok(Self::range(
                non_negative_millis("minimumDelay", body.minimum_delay)?,
                non_negative_millis("maximumDelay", body.maximum_delay)?,
            )),
            DelayUpdate::Fixed { delay } => Ok(Self::fixed(non_negative_millis("delay", delay)?)),
        }
    }
}

fn decode<T>(group: &'static str, payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::warn!(group, error = %rejection.body_text(), "Rejected malformed control payload");
            metrics::record_control_update(group, false);
            Err(ApiError::BadPayload(rejection.body_text()))
        }
    }
}

fn rejected(group: &'static str, err: ValidationError) -> ApiError {
    tracing::warn!(group, error = %err, "Rejected invalid control update");
    metrics::record_control_update(group, false);
    ApiError::Validation(err)
}

pub async fn get_rate_limit(State(control): State<Arc<ControlPlane>>) -> Json<RateLimitBody> {
    Json(RateLimitBody::from(&control.rate_limit().value))
}

pub async fn put_rate_limit(
    State(control): State<Arc<ControlPlane>>,
    payload: Result<Json<RateLimitBody>, JsonRejection>,
) -> Result<Json<RateLimitBody>, ApiError> {
    let body = decode("rate_limit", payload)?;
    let next = RateLimitConfig::try_from(body).map_err(|e| rejected("rate_limit", e))?;
    let snapshot = control
        .update_rate_limit(next)
        .map_err(|e| rejected("rate_limit", e))?;

    tracing::info!(
        rate = snapshot.value.rate,
        burst = snapshot.value.burst,
        version = snapshot.version,
        "Rate limit updated"
    );
    metrics::record_control_update("rate_limit", true);
    Ok(Json(RateLimitBody::from(&snapshot.value)))
}

pub async fn get_time_limit(State(control): State<Arc<ControlPlane>>) -> Json<TimeLimitBody> {
    Json(TimeLimitBody::from(&control.time_limit().value))
}

pub async fn put_time_limit(
    State(control): State<Arc<ControlPlane>>,
    payload: Result<Json<TimeLimitBody>, JsonRejection>,
) -> Result<Json<TimeLimitBody>, ApiError> {
    let body = decode("time_limit", payload)?;
    let next = DeadlineConfig::try_from(body).map_err(|e| rejected("time_limit", e))?;
    let snapshot = control
        .update_time_limit(next)
        .map_err(|e| rejected("time_limit", e))?;

    tracing::info!(
        timeout_ms = snapshot.value.timeout_ms,
        version = snapshot.version,
        "Time limit updated"
    );
    metrics::record_control_update("time_limit", true);
    Ok(Json(TimeLimitBody::from(&snapshot.value)))
}

pub async fn get_delay(State(control): State<Arc<ControlPlane>>) -> Json<DelayBody> {
    Json(DelayBody::from(&control.delay().value))
}

pub async fn put_delay(
    State(control): State<Arc<ControlPlane>>,
    payload: Result<Json<DelayUpdate>, JsonRejection>,
) -> Result<Json<DelayBody>, ApiError> {
    let update = decode("delay", payload)?;
    let next = DelayConfig::try_from(update).map_err(|e| rejected("delay", e))?;
    let snapshot = control.update_delay(next).map_err(|e| rejected("delay", e))?;

    tracing::info!(
        minimum_ms = snapshot.value.minimum_ms,
        maximum_ms = snapshot.value.maximum_ms,
        version = snapshot.version,
        "Delay updated"
    );
    metrics::record_control_update("delay", true);
    Ok(Json(DelayBody::from(&snapshot.value)))
}
