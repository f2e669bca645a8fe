//! Shared utilities for gateway integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::net::TcpListener;

use coap_gateway::coap::client::{CoapExchange, ExchangeError, NotificationHandler};
use coap_gateway::coap::message::{CoapRequest, CoapResponse};
use coap_gateway::config::GatewayConfig;
use coap_gateway::{HttpServer, MappingTable};

type ExecuteScript =
    Box<dyn Fn(&CoapRequest) -> Result<CoapResponse, ExchangeError> + Send + Sync>;

/// A scripted stand-in for the CoAP transport. Requests are captured for
/// assertions, one-shot exchanges are answered by the script, and observe
/// handlers can be driven by hand from the test body.
pub struct ScriptedExchange {
    script: ExecuteScript,
    seen: Mutex<Vec<CoapRequest>>,
    observers: Mutex<Vec<NotificationHandler>>,
}

impl ScriptedExchange {
    pub fn new(
        script: impl Fn(&CoapRequest) -> Result<CoapResponse, ExchangeError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            seen: Mutex::new(Vec::new()),
            observers: Mutex::new(Vec::new()),
        })
    }

    /// Requests captured so far, oldest first.
    #[allow(dead_code)]
    pub fn seen(&self) -> Vec<CoapRequest> {
        self.seen.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn last_request(&self) -> CoapRequest {
        self.seen.lock().unwrap().last().cloned().expect("no request captured")
    }

    /// Deliver a push notification to every registered observer.
    #[allow(dead_code)]
    pub fn push(&self, body: &str) {
        for handler in self.observers.lock().unwrap().iter() {
            handler(Ok(CoapResponse::new(
                coap_gateway::coap::message::response_code::CONTENT,
            )
            .with_payload(body)));
        }
    }

    /// Deliver a notification failure to every registered observer.
    #[allow(dead_code)]
    pub fn fail_observers(&self) {
        for handler in self.observers.lock().unwrap().iter() {
            handler(Err(ExchangeError::Transport("link down".into())));
        }
    }

    #[allow(dead_code)]
    pub fn observer_count(&self) -> usize {
        self.observers.lock().unwrap().len()
    }
}

#[async_trait]
impl CoapExchange for ScriptedExchange {
    async fn execute(&self, request: CoapRequest) -> Result<CoapResponse, ExchangeError> {
        self.seen.lock().unwrap().push(request.clone());
        (self.script)(&request)
    }

    async fn observe(
        &self,
        request: CoapRequest,
        handler: NotificationHandler,
    ) -> Result<(), ExchangeError> {
        self.seen.lock().unwrap().push(request);
        self.observers.lock().unwrap().push(handler);
        Ok(())
    }
}

/// Start a gateway on an ephemeral port backed by the given exchange.
pub async fn spawn_gateway(exchange: Arc<dyn CoapExchange>) -> SocketAddr {
    let mut config = GatewayConfig::default();
    config.observability.metrics_enabled = false;
    config.upstream.exchange_timeout_secs = 2;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let table = Arc::new(MappingTable::with_defaults());
    let server = HttpServer::new(config, table, exchange);
    tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });

    addr
}

/// An exchange that echoes the request payload and content-format back in a
/// 2.05 Content response.
#[allow(dead_code)]
pub fn echo_exchange() -> Arc<ScriptedExchange> {
    use coap_gateway::coap::message::response_code;
    use coap_gateway::coap::option::{self, CoapOption};

    ScriptedExchange::new(|request| {
        let mut response = CoapResponse::new(response_code::CONTENT);
        if let Some(format) = request.content_format() {
            response = response.with_option(CoapOption::integer(
                option::CONTENT_FORMAT,
                u32::from(format),
            ));
        }
        response.payload = request.payload.clone();
        Ok(response)
    })
}
