//! CoAP message model: method codes, response codes, requests and responses.
//!
//! Codes follow the RFC 7252 `class.detail` encoding: the numeric value is
//! `class << 5 | detail`, so 2.05 Content is 69 and 4.04 Not Found is 132.

use crate::coap::option::{self, CoapOption, OptionValue};

/// Request method codes.
pub mod code {
    pub const GET: u8 = 1;
    pub const POST: u8 = 2;
    pub const PUT: u8 = 3;
    pub const DELETE: u8 = 4;
}

/// Response codes used by the gateway and its tests.
pub mod response_code {
    /// 2.01 Created.
    pub const CREATED: u8 = 65;
    /// 2.04 Changed.
    pub const CHANGED: u8 = 68;
    /// 2.05 Content.
    pub const CONTENT: u8 = 69;
    /// 4.04 Not Found.
    pub const NOT_FOUND: u8 = 132;
    /// 5.00 Internal Server Error.
    pub const INTERNAL_SERVER_ERROR: u8 = 160;
}

/// Code class (the `N` in `N.xx`).
pub fn class_of(code: u8) -> u8 {
    code >> 5
}

/// 4.xx codes.
pub fn is_client_error(code: u8) -> bool {
    class_of(code) == 4
}

/// 5.xx codes.
pub fn is_server_error(code: u8) -> bool {
    class_of(code) == 5
}

/// An outbound CoAP request. The gateway only ever produces confirmable
/// requests: the HTTP side is already a reliable carrier, so there is no
/// caller that could want fire-and-forget delivery.
#[derive(Debug, Clone)]
pub struct CoapRequest {
    pub code: u8,
    pub confirmable: bool,
    pub options: Vec<CoapOption>,
    pub payload: Option<Vec<u8>>,
}

impl CoapRequest {
    pub fn new(code: u8) -> Self {
        Self {
            code,
            confirmable: true,
            options: Vec::new(),
            payload: None,
        }
    }

    pub fn add_option(&mut self, option: CoapOption) {
        self.options.push(option);
    }

    /// The embedded target address, carried in the Proxy-Uri option.
    pub fn proxy_uri(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.number == option::PROXY_URI)
            .and_then(|o| match &o.value {
                OptionValue::String(s) => Some(s.as_str()),
                _ => None,
            })
    }

    pub fn content_format(&self) -> Option<u16> {
        find_content_format(&self.options)
    }

    /// Options with the given number, in insertion order.
    pub fn options_of(&self, number: u16) -> Vec<&CoapOption> {
        self.options.iter().filter(|o| o.number == number).collect()
    }
}

/// An inbound CoAP response. Options arrive unordered; translation sorts
/// them by number first.
#[derive(Debug, Clone)]
pub struct CoapResponse {
    pub code: u8,
    pub options: Vec<CoapOption>,
    pub payload: Option<Vec<u8>>,
}

impl CoapResponse {
    pub fn new(code: u8) -> Self {
        Self {
            code,
            options: Vec::new(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_option(mut self, option: CoapOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn content_format(&self) -> Option<u16> {
        find_content_format(&self.options)
    }

    /// Payload rendered as text, the shape observe notifications are cached in.
    pub fn payload_text(&self) -> String {
        self.payload
            .as_deref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }
}

fn find_content_format(options: &[CoapOption]) -> Option<u16> {
    options
        .iter()
        .find(|o| o.number == option::CONTENT_FORMAT)
        .and_then(|o| o.integer_value())
        .map(|v| v as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_classes() {
        assert_eq!(class_of(response_code::CONTENT), 2);
        assert!(is_client_error(response_code::NOT_FOUND));
        assert!(is_server_error(response_code::INTERNAL_SERVER_ERROR));
        assert!(!is_client_error(response_code::CONTENT));
    }

    #[test]
    fn proxy_uri_lookup() {
        let mut req = CoapRequest::new(code::GET);
        assert_eq!(req.proxy_uri(), None);

        req.add_option(CoapOption::string(option::PROXY_URI, "coap://h:5683/r"));
        assert_eq!(req.proxy_uri(), Some("coap://h:5683/r"));
    }

    #[test]
    fn content_format_reads_integer_option() {
        let resp = CoapResponse::new(response_code::CONTENT)
            .with_option(CoapOption::integer(option::CONTENT_FORMAT, 50));
        assert_eq!(resp.content_format(), Some(50));
    }
}
