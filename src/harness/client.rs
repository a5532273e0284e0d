//! HTTP client used by the load harness.

use std::time::Duration;

use crate::config::ClientConfig;

/// Build the shared client from transport settings.
pub fn build_client(config: &ClientConfig) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs));

    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.http2_prior_knowledge {
        builder = builder.http2_prior_knowledge();
    }

    builder.build()
}
