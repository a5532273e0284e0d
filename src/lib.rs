//! Tunable HTTP admission-control and latency-injection harness.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────────┐
//!                       │                    HARNESS SERVER                    │
//!                       │                                                      │
//!   GET /ping           │  ┌──────────┐   ┌────────────┐   ┌───────────────┐   │
//!   ────────────────────┼─▶│ RateGate │──▶│ Deadline   │──▶│ DelayInjector │   │
//!                       │  │ (429)    │   │ Scope      │   │ (+ upstream)  │   │
//!                       │  └────▲─────┘   └─────▲──────┘   └───────▲───────┘   │
//!   200 / 429 / 504     │       │               │                  │           │
//!   ◀───────────────────┼───────┼───────────────┼──────────────────┘           │
//!                       │       │   snapshots   │                              │
//!                       │  ┌────┴───────────────┴──────────────────────────┐   │
//!   PUT /rate-limit     │  │                 ControlPlane                  │   │
//!   PUT /time-limit  ───┼─▶│  rate-limit │ time-limit │ delay  (ArcSwap)   │   │
//!   PUT /delay          │  └───────────────────────────────────────────────┘   │
//!                       └──────────────────────────────────────────────────────┘
//!
//!   LoadHarness: N requesters × M sequential GET /ping → OutcomeSink → RunReport
//! ```

// Core subsystems
pub mod config;
pub mod control;
pub mod http;
pub mod net;

// Pipeline stages
pub mod resilience;
pub mod security;

// Client side
pub mod harness;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::{HarnessConfig, ServerConfig};
pub use control::ControlPlane;
pub use harness::LoadHarness;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
