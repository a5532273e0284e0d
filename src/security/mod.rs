//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming /ping request:
//!     → rate_limit.rs (global token bucket; 429 when empty)
//!     → Pass to deadline stage
//! ```
//!
//! # Design Decisions
//! - Fail fast: rejection never queues or waits
//! - One bucket for the whole server, not per client

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateGate};
