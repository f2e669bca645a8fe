//! In-process demo upstream.
//!
//! Stands in for a real transport so the gateway runs end-to-end out of the
//! box: every exchange answers 2.05 with a counter line naming the target
//! resource, and observe registrations push the same line on an interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::coap::client::{CoapExchange, ExchangeError, NotificationHandler};
use crate::coap::media;
use crate::coap::message::{response_code, CoapRequest, CoapResponse};
use crate::coap::option::{self, CoapOption};

/// Notification interval for loopback observe registrations.
const PUSH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Default)]
pub struct LoopbackExchange {
    counter: AtomicU64,
}

impl LoopbackExchange {
    pub fn new() -> Self {
        Self::default()
    }

    fn respond(&self, request: &CoapRequest) -> CoapResponse {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let target = request.proxy_uri().unwrap_or("unknown");
        CoapResponse::new(response_code::CONTENT)
            .with_option(CoapOption::integer(
                option::CONTENT_FORMAT,
                u32::from(media::TEXT_PLAIN),
            ))
            .with_payload(format!("Response {} from resource {}", n, target))
    }
}

#[async_trait]
impl CoapExchange for LoopbackExchange {
    async fn execute(&self, request: CoapRequest) -> Result<CoapResponse, ExchangeError> {
        Ok(self.respond(&request))
    }

    async fn observe(
        &self,
        request: CoapRequest,
        handler: NotificationHandler,
    ) -> Result<(), ExchangeError> {
        let target = request.proxy_uri().unwrap_or("unknown").to_string();
        tokio::spawn(async move {
            let mut n: u64 = 0;
            let mut ticker = tokio::time::interval(PUSH_INTERVAL);
            loop {
                ticker.tick().await;
                n += 1;
                let notification = CoapResponse::new(response_code::CONTENT)
                    .with_payload(format!("Response {} from resource {}", n, target));
                handler(Ok(notification));
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coap::message::code;

    #[tokio::test]
    async fn responses_count_up() {
        let exchange = LoopbackExchange::new();
        let mut req = CoapRequest::new(code::GET);
        req.add_option(CoapOption::string(option::PROXY_URI, "coap://h/test"));

        let first = exchange.execute(req.clone()).await.unwrap();
        let second = exchange.execute(req).await.unwrap();
        assert_eq!(first.payload_text(), "Response 1 from resource coap://h/test");
        assert_eq!(second.payload_text(), "Response 2 from resource coap://h/test");
    }
}
