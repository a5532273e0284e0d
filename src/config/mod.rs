//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → initial snapshots for the control plane
//!
//! At runtime:
//!     PUT /rate-limit | /time-limit | /delay
//!     → validation.rs validates the single group
//!     → atomic swap of that group's snapshot
//!     → subsequent requests observe the new value
//! ```
//!
//! # Design Decisions
//! - The file is read once at startup; runtime changes go through the control plane
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ClientConfig, DeadlineConfig, DelayConfig, HarnessConfig, ListenerConfig, ObservabilityConfig,
    RateLimitConfig, ServerConfig, TlsConfig, TransportConfig, UpstreamConfig,
};
pub use validation::{Validate, ValidationError};
