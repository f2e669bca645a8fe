//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`, initialized at startup
//! - Metrics are cheap (atomic increments) and scraped, never pushed
//! - The request ID flows through all log events via the tracing layer

pub mod metrics;
