//! Direct-mode translation tests, end to end over a real listener.

use coap_gateway::coap::message::{response_code, CoapResponse};
use coap_gateway::coap::option::{self, CoapOption};

mod common;
use common::{echo_exchange, spawn_gateway, ScriptedExchange};

#[tokio::test]
async fn round_trip_preserves_payload_bytes() {
    let exchange = echo_exchange();
    let addr = spawn_gateway(exchange.clone()).await;

    let payload: Vec<u8> = (0u8..=255).collect();
    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/proxy/host:5683/res"))
        .header("content-type", "application/octet-stream")
        .body(payload.clone())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().to_vec(), payload);
}

#[tokio::test]
async fn weighted_accept_never_fails_structurally() {
    let exchange = echo_exchange();
    let addr = spawn_gateway(exchange.clone()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/proxy/host:5683/res"))
        .header("accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    // neither token before the weight cut resolves to a media code
    let request = exchange.last_request();
    assert!(request.options_of(option::ACCEPT).is_empty());
}

#[tokio::test]
async fn resolvable_accept_becomes_options() {
    let exchange = echo_exchange();
    let addr = spawn_gateway(exchange.clone()).await;

    let client = reqwest::Client::new();
    client
        .get(format!("http://{addr}/proxy/host:5683/res"))
        .header("accept", "application/json,text/plain")
        .send()
        .await
        .unwrap();

    let request = exchange.last_request();
    let accepts: Vec<u32> = request
        .options_of(option::ACCEPT)
        .iter()
        .filter_map(|o| o.integer_value())
        .collect();
    assert_eq!(accepts, vec![50, 0]);
}

#[tokio::test]
async fn cache_control_translates_to_max_age() {
    let exchange = echo_exchange();
    let addr = spawn_gateway(exchange.clone()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/proxy/host:5683/res");

    client
        .get(&url)
        .header("cache-control", "no-cache")
        .send()
        .await
        .unwrap();
    assert_eq!(
        exchange.last_request().options_of(option::MAX_AGE)[0].integer_value(),
        Some(0)
    );

    client
        .get(&url)
        .header("cache-control", "max-age=120")
        .send()
        .await
        .unwrap();
    assert_eq!(
        exchange.last_request().options_of(option::MAX_AGE)[0].integer_value(),
        Some(120)
    );

    client.get(&url).send().await.unwrap();
    assert!(exchange.last_request().options_of(option::MAX_AGE).is_empty());
}

#[tokio::test]
async fn missing_cache_control_is_injected_on_replies() {
    let exchange = ScriptedExchange::new(|_| Ok(CoapResponse::new(response_code::CONTENT)));
    let addr = spawn_gateway(exchange).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/proxy/host:5683/res"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["cache-control"], "max-age=60");
}

#[tokio::test]
async fn embedded_address_is_extracted() {
    let exchange = echo_exchange();
    let addr = spawn_gateway(exchange.clone()).await;

    reqwest::Client::new()
        .get(format!("http://{addr}/proxy/coap://host:5683/a/b"))
        .send()
        .await
        .unwrap();

    assert_eq!(
        exchange.last_request().proxy_uri(),
        Some("coap://host:5683/a/b")
    );
}

#[tokio::test]
async fn scheme_defaults_to_unsecured() {
    let exchange = echo_exchange();
    let addr = spawn_gateway(exchange.clone()).await;

    reqwest::Client::new()
        .get(format!("http://{addr}/proxy/host:5683/a/b"))
        .send()
        .await
        .unwrap();

    assert_eq!(
        exchange.last_request().proxy_uri(),
        Some("coap://host:5683/a/b")
    );
}

#[tokio::test]
async fn unsupported_method_answers_not_implemented() {
    let exchange = echo_exchange();
    let addr = spawn_gateway(exchange).await;

    let response = reqwest::Client::new()
        .patch(format!("http://{addr}/proxy/host:5683/res"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 501);
}

#[tokio::test]
async fn transport_failure_answers_bad_gateway() {
    let exchange = ScriptedExchange::new(|_| {
        Err(coap_gateway::coap::client::ExchangeError::Transport(
            "unreachable".into(),
        ))
    });
    let addr = spawn_gateway(exchange).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/proxy/host:5683/res"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
}

#[tokio::test]
async fn error_reply_without_format_is_plain_text() {
    let exchange = ScriptedExchange::new(|_| {
        Ok(CoapResponse::new(response_code::NOT_FOUND).with_payload("no such resource"))
    });
    let addr = spawn_gateway(exchange).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/proxy/host:5683/res"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=UTF-8"
    );
    assert_eq!(response.text().await.unwrap(), "no such resource");
}

#[tokio::test]
async fn etag_option_renders_stripped_and_quoted() {
    let exchange = ScriptedExchange::new(|_| {
        Ok(CoapResponse::new(response_code::CONTENT)
            .with_option(CoapOption::opaque(option::ETAG, vec![0xab, 0xcd])))
    });
    let addr = spawn_gateway(exchange).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/proxy/host:5683/res"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["etag"], "\"abcd\"");
}

#[tokio::test]
async fn zero_length_body_attaches_no_payload() {
    let exchange = echo_exchange();
    let addr = spawn_gateway(exchange.clone()).await;

    reqwest::Client::new()
        .post(format!("http://{addr}/proxy/host:5683/res"))
        .send()
        .await
        .unwrap();

    let request = exchange.last_request();
    assert!(request.payload.is_none());
    // content-format still derives from the (absent) header, not the body
    assert_eq!(request.content_format(), Some(42));
}

#[tokio::test]
async fn head_requests_get_headers_without_body() {
    let exchange = ScriptedExchange::new(|_| {
        Ok(CoapResponse::new(response_code::CONTENT)
            .with_option(CoapOption::integer(option::CONTENT_FORMAT, 0))
            .with_payload("cached value"))
    });
    let addr = spawn_gateway(exchange).await;

    let response = reqwest::Client::new()
        .head(format!("http://{addr}/proxy/host:5683/res"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.bytes().await.unwrap().is_empty());
}
