//! Gateway entry point: configuration, logging, metrics, server.

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coap_gateway::coap::client::CoapExchange;
use coap_gateway::coap::loopback::LoopbackExchange;
use coap_gateway::config::{self, GatewayConfig};
use coap_gateway::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coap_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("coap-gateway v0.1.0 starting");

    // Load configuration; first argument names an optional config file
    let config = match std::env::args().nth(1) {
        Some(path) => config::load_config(Path::new(&path))?,
        None => GatewayConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        direct_prefix = %config.proxy.direct_prefix,
        observe_prefix = %config.proxy.observe_prefix,
        exchange_timeout_secs = config.upstream.exchange_timeout_secs,
        "Configuration loaded"
    );

    let table = Arc::new(config::load_mapping(&config)?);
    tracing::info!(entries = table.len(), "Mapping table ready");

    // The transport stack is a collaborator; without one configured, the
    // in-process loopback upstream answers every exchange.
    let exchange: Arc<dyn CoapExchange> = if config.upstream.loopback {
        tracing::warn!("Using the loopback upstream; no CoAP network will be reached");
        Arc::new(LoopbackExchange::new())
    } else {
        return Err("no CoAP transport configured: plug a CoapExchange implementation \
                    or set upstream.loopback = true"
            .into());
    };

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Initialize metrics server
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            coap_gateway::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Create and run HTTP server
    let server = HttpServer::new(config, table, exchange);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
