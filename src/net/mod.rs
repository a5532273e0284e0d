//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → tls.rs (optional TLS handshake, PEM cert/key from config)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional; without a `[listener.tls]` section the server speaks plain HTTP
//! - Certificate problems are startup errors, never per-request ones

pub mod tls;
