//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the harness server.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the harness server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Transport-level settings.
    pub server: TransportConfig,

    /// Initial rate limit applied to `/ping`.
    pub rate_limit: RateLimitConfig,

    /// Initial per-request deadline.
    pub time_limit: DeadlineConfig,

    /// Initial injected delay bounds.
    pub delay: DelayConfig,

    /// Optional upstream fetched after the delay completes.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    pub bind_address: String,

    /// Optional TLS configuration. Plain HTTP when absent.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8443".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Transport-level limits, independent of the per-request deadline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Hard cap on the total time spent serving one request, in seconds.
    pub request_timeout_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            shutdown_grace_secs: 5,
        }
    }
}

/// Token bucket parameters for the admission gate.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Refill rate in requests per second. `0` disables limiting.
    pub rate: f64,

    /// Bucket capacity.
    pub burst: u32,
}

impl RateLimitConfig {
    pub fn disabled() -> Self {
        Self { rate: 0.0, burst: 1 }
    }

    pub fn is_enabled(&self) -> bool {
        self.rate > 0.0
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Per-request deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeadlineConfig {
    /// Deadline in milliseconds. `0` disables the deadline.
    pub timeout_ms: u64,
}

impl DeadlineConfig {
    pub fn from_millis(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    /// The deadline as a duration, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

/// Bounds for the injected delay, in milliseconds.
///
/// `minimum == maximum` is the fixed-delay form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DelayConfig {
    pub minimum_ms: u64,
    pub maximum_ms: u64,
}

impl DelayConfig {
    pub fn fixed(delay_ms: u64) -> Self {
        Self {
            minimum_ms: delay_ms,
            maximum_ms: delay_ms,
        }
    }

    pub fn range(minimum_ms: u64, maximum_ms: u64) -> Self {
        Self {
            minimum_ms,
            maximum_ms,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.minimum_ms == self.maximum_ms
    }
}

/// Upstream fetched by `/ping` once the injected delay has elapsed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full URL of the upstream endpoint. Disabled when absent.
    pub url: Option<String>,

    /// Connect timeout for the upstream client, in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: None,
            connect_timeout_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Load harness settings (client side).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Server base URL; requests go to `{base_url}/ping`.
    pub base_url: String,

    /// Number of concurrent requesters.
    pub requesters: usize,

    /// Sequential requests issued by each requester.
    pub requests_per_requester: usize,

    /// Pause between two requests of the same requester, in milliseconds.
    pub pause_ms: u64,

    /// HTTP client transport settings.
    pub client: ClientConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8443".to_string(),
            requesters: 5,
            requests_per_requester: 10,
            pause_ms: 0,
            client: ClientConfig::default(),
        }
    }
}

/// Transport settings for the load harness client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Whole-request timeout in milliseconds. `0` disables it.
    pub timeout_ms: u64,

    /// Accept self-signed server certificates.
    pub accept_invalid_certs: bool,

    /// Speak HTTP/2 without negotiation.
    pub http2_prior_knowledge: bool,

    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,

    /// Idle connection lifetime in seconds.
    pub pool_idle_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 500,
            accept_invalid_certs: true,
            http2_prior_knowledge: false,
            pool_max_idle_per_host: 1000,
            pool_idle_timeout_secs: 60,
        }
    }
}
