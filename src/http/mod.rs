//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, trace, transport timeout)
//!     → /ping          → ping.rs (rate gate → deadline scope → delay → response)
//!     → /rate-limit, /time-limit, /delay → control plane handlers
//!     → response.rs (errors rendered as JSON)
//!     → Send to client
//! ```

pub mod ping;
pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use ping::{PingResponse, PingState};
pub use request::MakeRequestUuidV4;
pub use response::ApiError;
pub use server::{AppState, HttpServer, ServerError};
