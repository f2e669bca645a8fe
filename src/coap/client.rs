//! The seam to the CoAP transport stack.
//!
//! # Responsibilities
//! - Define the exchange contract the gateway core depends on
//! - Keep framing, retransmission, blockwise transfer and DTLS behind it
//!
//! # Design Decisions
//! - The transport is an external collaborator; this crate never speaks the
//!   wire format itself
//! - Dropping the future returned by `execute` abandons the exchange, which
//!   ties its lifetime to the inbound request task

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::coap::message::{CoapRequest, CoapResponse};

/// Errors reported by the transport collaborator.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The exchange exceeded its deadline.
    #[error("exchange timed out after {0:?}")]
    Timeout(Duration),

    /// The transport failed (unreachable host, reset, framing fault).
    #[error("transport error: {0}")]
    Transport(String),

    /// The exchange was cancelled before completing.
    #[error("exchange cancelled")]
    Cancelled,
}

/// Callback invoked for every observe notification (or notification failure)
/// on a registered watch.
pub type NotificationHandler = Box<dyn Fn(Result<CoapResponse, ExchangeError>) + Send + Sync>;

/// A CoAP client capable of one-shot exchanges and long-lived observe
/// registrations against the target addressed by the request's Proxy-Uri.
#[async_trait]
pub trait CoapExchange: Send + Sync {
    /// Perform one confirmable request/response exchange.
    async fn execute(&self, request: CoapRequest) -> Result<CoapResponse, ExchangeError>;

    /// Register a long-lived watch on the target resource. The handler is
    /// driven by the transport's notification delivery, never by the caller.
    async fn observe(
        &self,
        request: CoapRequest,
        handler: NotificationHandler,
    ) -> Result<(), ExchangeError>;
}
