//! Direct-mode request lifecycle.
//!
//! # Responsibilities
//! - Drive one request through translate → exchange → translate-reply
//! - Map every failure to a gateway status; the caller is always answered
//! - Bound the exchange with the configured timeout and cancel it on
//!   shutdown
//!
//! # Design Decisions
//! - Misrouted requests answer bad-gateway without touching the network
//! - The exchange future lives inside the request task, so an abandoned
//!   connection drops the in-flight exchange with it

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::sync::broadcast;

use crate::coap::client::{CoapExchange, ExchangeError};
use crate::mapping::MappingTable;
use crate::observability::metrics;
use crate::translate::{RequestTranslator, ResponseTranslator, TranslationError};

use super::request::RequestIdExt;

/// Gateway status for each translation failure class.
pub fn failure_status(error: &TranslationError) -> (StatusCode, &'static str) {
    match error {
        TranslationError::UnsupportedMethod(_) => {
            (StatusCode::NOT_IMPLEMENTED, "method not supported by the gateway")
        }
        TranslationError::MalformedUri(_) => (StatusCode::BAD_REQUEST, "malformed target address"),
        TranslationError::BodyRead(_) | TranslationError::Translation(_) => {
            (StatusCode::BAD_GATEWAY, "translation failed")
        }
    }
}

pub struct Dispatcher {
    translator: RequestTranslator,
    responder: ResponseTranslator,
    exchange: Arc<dyn CoapExchange>,
    exchange_timeout: Duration,
    prefix: String,
}

impl Dispatcher {
    pub fn new(
        table: Arc<MappingTable>,
        exchange: Arc<dyn CoapExchange>,
        exchange_timeout: Duration,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            translator: RequestTranslator::new(table.clone()),
            responder: ResponseTranslator::new(table),
            exchange,
            exchange_timeout,
            prefix: prefix.into(),
        }
    }

    /// Run one request to completion. Every path out of here carries a
    /// well-formed response.
    pub async fn dispatch(
        &self,
        parts: &Parts,
        body: &[u8],
        mut cancel: broadcast::Receiver<()>,
    ) -> Response {
        let started = Instant::now();
        let request_id = parts.headers.request_id().to_string();

        let coap_request = match self.translator.translate(parts, body, &self.prefix) {
            Ok(Some(request)) => request,
            Ok(None) => {
                return self.fail(
                    StatusCode::BAD_GATEWAY,
                    "no mapping for request path",
                    &request_id,
                    started,
                );
            }
            Err(e) => {
                let (status, message) = failure_status(&e);
                tracing::warn!(request_id = %request_id, error = %e, "Request translation failed");
                return self.fail(status, message, &request_id, started);
            }
        };
        let translated_at = Instant::now();
        metrics::record_phase("translate_request", translated_at - started);

        tracing::debug!(
            request_id = %request_id,
            target = coap_request.proxy_uri().unwrap_or(""),
            "Forwarding exchange"
        );

        let outcome = tokio::select! {
            result = tokio::time::timeout(self.exchange_timeout, self.exchange.execute(coap_request)) => {
                match result {
                    Ok(inner) => inner,
                    Err(_) => Err(ExchangeError::Timeout(self.exchange_timeout)),
                }
            }
            _ = wait_cancelled(&mut cancel) => Err(ExchangeError::Cancelled),
        };
        let exchanged_at = Instant::now();
        metrics::record_phase("exchange", exchanged_at - translated_at);

        let coap_response = match outcome {
            Ok(response) => response,
            Err(ExchangeError::Timeout(after)) => {
                tracing::warn!(request_id = %request_id, ?after, "Exchange timed out");
                return self.fail(
                    StatusCode::GATEWAY_TIMEOUT,
                    "upstream exchange timed out",
                    &request_id,
                    started,
                );
            }
            Err(ExchangeError::Cancelled) => {
                tracing::info!(request_id = %request_id, "Exchange cancelled by shutdown");
                return self.fail(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "gateway shutting down",
                    &request_id,
                    started,
                );
            }
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Exchange failed");
                return self.fail(
                    StatusCode::BAD_GATEWAY,
                    "upstream exchange failed",
                    &request_id,
                    started,
                );
            }
        };

        let reply = match self.responder.translate(&coap_response, &parts.method) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Response translation failed");
                return self.fail(
                    StatusCode::BAD_GATEWAY,
                    "translation failed",
                    &request_id,
                    started,
                );
            }
        };
        metrics::record_phase("translate_response", exchanged_at.elapsed());
        metrics::record_request("direct", reply.status.as_u16(), started);

        tracing::debug!(
            request_id = %request_id,
            status = reply.status.as_u16(),
            translate_us = (translated_at - started).as_micros() as u64,
            exchange_us = (exchanged_at - translated_at).as_micros() as u64,
            "Request complete"
        );
        reply.into_response()
    }

    fn fail(
        &self,
        status: StatusCode,
        message: &'static str,
        request_id: &str,
        started: Instant,
    ) -> Response {
        tracing::debug!(request_id = %request_id, status = status.as_u16(), reason = message, "Answering failure");
        metrics::record_request("direct", status.as_u16(), started);
        (status, message).into_response()
    }
}

/// Resolve only on a real shutdown signal. A closed channel means no
/// coordinator is listening, which must not read as a cancellation.
async fn wait_cancelled(cancel: &mut broadcast::Receiver<()>) {
    loop {
        match cancel.recv().await {
            Ok(()) => return,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}
