//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (rate ≥ 0, burst ≥ 1, minimum ≤ maximum)
//! - Shared by startup config loading and runtime control updates
//!
//! # Design Decisions
//! - Startup validation returns all validation errors, not just first
//! - Validation is pure function: config → Result<(), ValidationError>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{
    DeadlineConfig, DelayConfig, HarnessConfig, RateLimitConfig, ServerConfig,
};

/// A violated configuration invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("rate must be a finite number >= 0, got {0}")]
    InvalidRate(f64),

    #[error("burst must be >= 1, got {0}")]
    BurstTooSmall(i64),

    #[error("burst must be <= {max}, got {value}", max = u32::MAX)]
    BurstTooLarge { value: i64 },

    #[error("{field} must be >= 0, got {value}")]
    NegativeDuration { field: &'static str, value: i64 },

    #[error("minimumDelay ({minimum}) must not exceed maximumDelay ({maximum})")]
    DelayRangeInverted { minimum: u64, maximum: u64 },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be > 0")]
    ZeroTimeout { field: &'static str },

    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },
}

/// A configuration group whose invariants can be checked in isolation.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(ValidationError::InvalidRate(self.rate));
        }
        if self.burst < 1 {
            return Err(ValidationError::BurstTooSmall(i64::from(self.burst)));
        }
        Ok(())
    }
}

impl Validate for DeadlineConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // Every u64 millisecond value is a valid deadline; 0 means disabled.
        Ok(())
    }
}

impl Validate for DelayConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.minimum_ms > self.maximum_ms {
            return Err(ValidationError::DelayRangeInverted {
                minimum: self.minimum_ms,
                maximum: self.maximum_ms,
            });
        }
        Ok(())
    }
}

/// Convert a signed millisecond value from the wire into an unsigned one.
pub fn non_negative_millis(field: &'static str, value: i64) -> Result<u64, ValidationError> {
    u64::try_from(value).map_err(|_| ValidationError::NegativeDuration { field, value })
}

/// Convert a signed burst value from the wire into the bucket capacity.
pub fn burst_from_wire(value: i64) -> Result<u32, ValidationError> {
    if value < 1 {
        return Err(ValidationError::BurstTooSmall(value));
    }
    u32::try_from(value).map_err(|_| ValidationError::BurstTooLarge { value })
}

/// Validate a full server configuration, collecting every violation.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "server.request_timeout_secs",
        });
    }

    if let Some(url) = &config.upstream.url {
        if !is_http_url(url) {
            errors.push(ValidationError::InvalidUrl {
                field: "upstream.url",
                value: url.clone(),
            });
        }
    }

    let groups: [&dyn Validate; 3] = [&config.rate_limit, &config.time_limit, &config.delay];
    errors.extend(groups.iter().filter_map(|group| group.validate().err()));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate load harness settings.
pub fn validate_harness(config: &HarnessConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if !is_http_url(&config.base_url) {
        errors.push(ValidationError::InvalidUrl {
            field: "base_url",
            value: config.base_url.clone(),
        });
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    reqwest::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
