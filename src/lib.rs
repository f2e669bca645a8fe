//! HTTP ⇄ CoAP application-layer gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                    GATEWAY                        │
//!   HTTP Request     │  ┌────────┐   ┌────────────┐   ┌──────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ translate  │──▶│ coap client  │──┼──▶ CoAP
//!                    │  │ server │   │  request   │   │  (exchange)  │  │    network
//!                    │  └────────┘   └────────────┘   └──────┬───────┘  │
//!                    │                                       │          │
//!   HTTP Response    │  ┌────────────┐                       │          │
//!   ◀────────────────┼──│ translate  │◀──────────────────────┘          │
//!                    │  │  response  │                                  │
//!                    │  └────────────┘                                  │
//!                    │                                                  │
//!   HTTP Poll        │  ┌────────────────┐      push notifications      │
//!   ◀───────────────▶┼──│ observe bridge │◀─────────────────────────────┼──── CoAP
//!                    │  │ (cached state) │                              │    observe
//!                    │  └────────────────┘                              │
//!                    │                                                  │
//!                    │  config · mapping table · observability · lifecycle
//!                    └──────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod coap;
pub mod config;
pub mod http;
pub mod mapping;
pub mod observe;
pub mod translate;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use mapping::MappingTable;
