//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize metrics exporter when enabled
//! - Build the server from a validated configuration
//! - Bind a plain or TLS listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use crate::config::ServerConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::shutdown::Shutdown;
use crate::net::tls::load_listener_tls;
use crate::observability::metrics;

/// Serve `config` until `shutdown` is triggered.
pub async fn start(config: ServerConfig, shutdown: &Shutdown) -> Result<(), ServerError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let addr: SocketAddr = config
        .listener
        .bind_address
        .parse()
        .map_err(|_| ServerError::BindAddress(config.listener.bind_address.clone()))?;
    let tls = config.listener.tls.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let rustls = load_listener_tls(&tls).await?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            server.run(listener, shutdown.subscribe()).await
        }
    }
}
