//! HTTP server setup and the two gateway entry points.
//!
//! # Responsibilities
//! - Build the axum Router with the direct and observe prefix routes
//! - Wire up middleware (tracing, timeout, request ID)
//! - Hand direct requests to the Dispatcher and polls to the ObserveBridge
//! - Run with graceful shutdown, cancelling in-flight exchanges

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::coap::client::CoapExchange;
use crate::config::GatewayConfig;
use crate::http::dispatch::{failure_status, Dispatcher};
use crate::http::request::RequestIdLayer;
use crate::lifecycle::Shutdown;
use crate::mapping::MappingTable;
use crate::observability::metrics;
use crate::observe::ObserveBridge;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub bridge: Arc<ObserveBridge>,
    pub shutdown: Arc<Shutdown>,
    pub max_body_bytes: usize,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    shutdown: Arc<Shutdown>,
}

impl HttpServer {
    /// Create a new server over a loaded mapping table and a transport
    /// collaborator.
    pub fn new(
        config: GatewayConfig,
        table: Arc<MappingTable>,
        exchange: Arc<dyn CoapExchange>,
    ) -> Self {
        let shutdown = Arc::new(Shutdown::new());
        let dispatcher = Arc::new(Dispatcher::new(
            table.clone(),
            exchange.clone(),
            Duration::from_secs(config.upstream.exchange_timeout_secs),
            config.proxy.direct_prefix.clone(),
        ));
        let bridge = Arc::new(ObserveBridge::new(
            table,
            exchange,
            config.proxy.observe_prefix.clone(),
        ));

        let state = AppState {
            dispatcher,
            bridge,
            shutdown: shutdown.clone(),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            shutdown,
        }
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route(
                &format!("{}{{*target}}", config.proxy.direct_prefix),
                any(direct_handler),
            )
            .route(
                &format!("{}{{*target}}", config.proxy.observe_prefix),
                get(observe_handler),
            )
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            direct_prefix = %self.config.proxy.direct_prefix,
            observe_prefix = %self.config.proxy.observe_prefix,
            "HTTP server starting"
        );

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Handle for triggering shutdown programmatically (tests, embedding).
    pub fn shutdown_handle(&self) -> Arc<Shutdown> {
        self.shutdown.clone()
    }
}

/// Direct-mode entry point: translate, exchange, translate back.
async fn direct_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let cancel = state.shutdown.subscribe();
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return (StatusCode::BAD_GATEWAY, "failed to read request body").into_response();
        }
    };

    state.dispatcher.dispatch(&parts, &body, cancel).await
}

/// Observe-mode entry point: serve the cached representation, subscribing
/// on first contact. Never blocks on the network for the reply.
async fn observe_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let (parts, _) = request.into_parts();

    let response = match state.bridge.poll(&parts).await {
        Ok(Some(reading)) => {
            let quoted = format!("\"{}\"", reading.etag);
            match HeaderValue::from_str(&quoted) {
                Ok(value) => {
                    ([(axum::http::header::ETAG, value)], reading.body).into_response()
                }
                Err(_) => reading.body.into_response(),
            }
        }
        Ok(None) => {
            (StatusCode::BAD_GATEWAY, "no mapping for request path").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Observe poll failed");
            let (status, message) = failure_status(&e);
            (status, message).into_response()
        }
    };

    metrics::record_request("observe", response.status().as_u16(), started);
    response
}

/// Wait for Ctrl+C, then fan the shutdown out to in-flight work.
async fn shutdown_signal(shutdown: Arc<Shutdown>) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
