//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the ping pipeline and control endpoints
//! - Wire up middleware (tracing, request ID, transport timeout)
//! - Bind server to a plain or TLS listener
//! - Stop accepting and drain on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::get,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::control::{setup_control_router, ControlPlane};
use crate::http::ping::{ping, PingState};
use crate::http::request::{request_id_of, MakeRequestUuidV4};
use crate::http::upstream::Upstream;
use crate::resilience::delay::DelayInjector;
use crate::resilience::timeouts::{deadline_middleware, Deadlines};
use crate::security::rate_limit::{rate_limit_middleware, RateGate};

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("invalid bind address {0}")]
    BindAddress(String),
}

/// Shared components of the request pipeline.
#[derive(Clone)]
pub struct AppState {
    pub control: Arc<ControlPlane>,
    pub gate: Arc<RateGate>,
    pub deadlines: Arc<Deadlines>,
    pub ping: PingState,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let control = Arc::new(ControlPlane::from_config(config));
        let gate = Arc::new(RateGate::new(control.rate_limit_cell()));
        let deadlines = Arc::new(Deadlines::new(control.time_limit_cell()));
        let ping = PingState {
            delays: Arc::new(DelayInjector::new(control.delay_cell())),
            upstream: Upstream::from_config(&config.upstream)?,
        };

        Ok(Self {
            control,
            gate,
            deadlines,
            ping,
        })
    }
}

/// HTTP server for the admission harness.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, &state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: &AppState) -> Router {
        // Layers wrap outwards: the rate gate runs before the deadline scope opens.
        let ping_routes = Router::new()
            .route("/ping", get(ping))
            .with_state(state.ping.clone())
            .layer(middleware::from_fn_with_state(
                state.deadlines.clone(),
                deadline_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                state.gate.clone(),
                rate_limit_middleware,
            ));

        Router::new()
            .merge(ping_routes)
            .merge(setup_control_router(state.control.clone()))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %request_id_of(request),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.server.request_timeout_secs,
                    ))),
            )
    }

    /// Run the server on a plain TCP listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, tls = false, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server behind TLS until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        tracing::info!(address = %addr, tls = true, "HTTP server starting");

        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.server.shutdown_grace_secs);
        tokio::spawn({
            let handle = handle.clone();
            async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
                handle.graceful_shutdown(Some(grace));
            }
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
