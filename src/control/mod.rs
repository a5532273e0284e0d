//! Runtime control plane.
//!
//! # Data Flow
//! ```text
//! GET  /rate-limit | /time-limit | /delay
//!     → handlers.rs → ControlPlane::<group>() → current snapshot → JSON
//!
//! PUT  /rate-limit | /time-limit | /delay
//!     → handlers.rs (decode wire body, convert signed values)
//!     → ConfigCell::update (validate, serialize writers, swap)
//!     → RateGate / Deadlines / DelayInjector read the new snapshot
//!       on their next request
//! ```
//!
//! # Design Decisions
//! - One cell per parameter group; groups never change together
//! - Readers take a single snapshot per use and never re-read mid-request
//! - Control endpoints sit outside the ping pipeline

pub mod cell;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::config::{
    DeadlineConfig, DelayConfig, RateLimitConfig, ServerConfig, ValidationError,
};
use self::cell::{ConfigCell, Snapshot};
use self::handlers::*;

/// Owner of the three runtime-mutable parameter groups.
#[derive(Debug)]
pub struct ControlPlane {
    rate_limit: Arc<ConfigCell<RateLimitConfig>>,
    time_limit: Arc<ConfigCell<DeadlineConfig>>,
    delay: Arc<ConfigCell<DelayConfig>>,
}

impl ControlPlane {
    pub fn new(
        rate_limit: RateLimitConfig,
        time_limit: DeadlineConfig,
        delay: DelayConfig,
    ) -> Self {
        Self {
            rate_limit: Arc::new(ConfigCell::new(rate_limit)),
            time_limit: Arc::new(ConfigCell::new(time_limit)),
            delay: Arc::new(ConfigCell::new(delay)),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.rate_limit, config.time_limit, config.delay)
    }

    pub fn rate_limit(&self) -> Arc<Snapshot<RateLimitConfig>> {
        self.rate_limit.get()
    }

    pub fn update_rate_limit(
        &self,
        next: RateLimitConfig,
    ) -> Result<Arc<Snapshot<RateLimitConfig>>, ValidationError> {
        self.rate_limit.update(next)
    }

    pub fn time_limit(&self) -> Arc<Snapshot<DeadlineConfig>> {
        self.time_limit.get()
    }

    pub fn update_time_limit(
        &self,
        next: DeadlineConfig,
    ) -> Result<Arc<Snapshot<DeadlineConfig>>, ValidationError> {
        self.time_limit.update(next)
    }

    pub fn delay(&self) -> Arc<Snapshot<DelayConfig>> {
        self.delay.get()
    }

    pub fn update_delay(
        &self,
        next: DelayConfig,
    ) -> Result<Arc<Snapshot<DelayConfig>>, ValidationError> {
        self.delay.update(next)
    }

    /// Shared handle for the admission gate.
    pub fn rate_limit_cell(&self) -> Arc<ConfigCell<RateLimitConfig>> {
        self.rate_limit.clone()
    }

    /// Shared handle for the deadline opener.
    pub fn time_limit_cell(&self) -> Arc<ConfigCell<DeadlineConfig>> {
        self.time_limit.clone()
    }

    /// Shared handle for the delay injector.
    pub fn delay_cell(&self) -> Arc<ConfigCell<DelayConfig>> {
        self.delay.clone()
    }
}

impl Default for ControlPlane {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

pub fn setup_control_router(control: Arc<ControlPlane>) -> Router {
    Router::new()
        .route("/rate-limit", get(get_rate_limit).put(put_rate_limit))
        .route("/time-limit", get(get_time_limit).put(put_time_limit))
        .route("/delay", get(get_delay).put(put_delay))
        .with_state(control)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_are_independent() {
        let control = ControlPlane::default();
        control.update_delay(DelayConfig::range(10, 50)).unwrap();

        assert_eq!(control.delay().version, 2);
        assert_eq!(control.rate_limit().version, 1);
        assert_eq!(control.time_limit().version, 1);
    }

    #[test]
    fn test_cells_share_state_with_control_plane() {
        let control = ControlPlane::default();
        let cell = control.time_limit_cell();
        control.update_time_limit(DeadlineConfig::from_millis(75)).unwrap();
        assert_eq!(cell.get().value.timeout_ms, 75);
    }
}
