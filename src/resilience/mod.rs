//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted /ping request:
//!     → timeouts.rs (open a deadline scope from the current time limit)
//!     → delay.rs (sleep for the injected delay, racing the scope's expiry)
//!     → scope closed, outcome handed back to the handler
//! ```
//!
//! # Design Decisions
//! - Deadline expiry is the only cancellation source inside a request
//! - Expiry interrupts the wait, never the response
//! - All timing goes through `tokio::time`, so tests can pause the clock

pub mod delay;
pub mod timeouts;

pub use delay::{DelayInjector, WaitOutcome};
pub use timeouts::{deadline_middleware, DeadlineScope, Deadlines, ScopeSignal, ScopeState};
