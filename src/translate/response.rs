//! CoAP response → HTTP response translation.
//!
//! # Responsibilities
//! - Map response code, options and payload onto status line, headers and
//!   body
//! - Resolve the content-type (with charset) from the content-format code
//!
//! # Design Decisions
//! - A response code with no status mapping is fatal; there is no sensible
//!   default status
//! - Unmappable options are dropped silently (lossy, not fatal)
//! - Payload bytes pass through unmodified; the charset parameter never
//!   triggers re-encoding of the body itself

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::coap::media;
use crate::coap::message::{self, CoapResponse};
use crate::coap::option::{self, OptionFormat};
use crate::mapping::MappingTable;
use crate::translate::error::TranslationError;

const OCTET_STREAM: &str = "application/octet-stream";

/// A fully translated HTTP reply.
#[derive(Debug)]
pub struct HttpReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl IntoResponse for HttpReply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[derive(Clone)]
pub struct ResponseTranslator {
    table: Arc<MappingTable>,
}

impl ResponseTranslator {
    pub fn new(table: Arc<MappingTable>) -> Self {
        Self { table }
    }

    pub fn translate(
        &self,
        response: &CoapResponse,
        request_method: &Method,
    ) -> Result<HttpReply, TranslationError> {
        let status_value = self.table.status_for(response.code).ok_or_else(|| {
            TranslationError::Translation(format!(
                "no status mapping for response code {}",
                response.code
            ))
        })?;
        let status = StatusCode::from_u16(status_value).map_err(|_| {
            TranslationError::Translation(format!("mapped status {status_value} out of range"))
        })?;

        let mut headers = HeaderMap::new();
        for opt in option::sorted(&response.options) {
            match opt.number {
                // translated with the payload
                option::CONTENT_FORMAT => continue,
                option::ETAG => {
                    // Hex-render the value, drop the two leading characters
                    // of that rendering, quote the remainder. Kept exactly
                    // for wire compatibility.
                    let rendered = opt.opaque_string();
                    let quoted = format!("\"{}\"", &rendered[2..]);
                    set_header(&mut headers, "etag", &quoted);
                }
                number => {
                    let Some(name) = self.table.header_name(number) else {
                        continue;
                    };
                    let value = match option::format_of(number) {
                        OptionFormat::String => opt.string_value(),
                        OptionFormat::Integer => match opt.integer_value() {
                            Some(v) => v.to_string(),
                            None => continue,
                        },
                        OptionFormat::Opaque => opt.opaque_string(),
                        // not formattable
                        _ => continue,
                    };
                    let value = if number == option::MAX_AGE {
                        format!("max-age={value}")
                    } else {
                        value
                    };
                    let name = name.to_string();
                    set_header(&mut headers, &name, &value);
                }
            }
        }

        if !headers.contains_key(header::CACHE_CONTROL) {
            set_header(
                &mut headers,
                "cache-control",
                &format!("max-age={}", option::DEFAULT_MAX_AGE),
            );
        }

        let mut body = Vec::new();
        if request_method != Method::HEAD {
            if let Some(payload) = response.payload.as_deref() {
                if !payload.is_empty() {
                    let mut format = response.content_format();
                    // untyped error bodies should render as readable text
                    if format.is_none()
                        && (message::is_client_error(response.code)
                            || message::is_server_error(response.code))
                    {
                        tracing::debug!(code = response.code, "Forcing text/plain for error body");
                        format = Some(media::TEXT_PLAIN);
                    }
                    let content_type = self.resolve_content_type(format);
                    set_header(&mut headers, "content-type", &content_type);
                    body = payload.to_vec();
                }
            }
        }

        Ok(HttpReply {
            status,
            headers,
            body,
        })
    }

    /// Direct mapping on the media code, canonical registry string with a
    /// charset suffix for printable formats, octet-stream as the floor.
    fn resolve_content_type(&self, format: Option<u16>) -> String {
        let Some(code) = format else {
            return OCTET_STREAM.to_string();
        };

        let raw = self
            .table
            .media_name(code)
            .map(str::to_string)
            .or_else(|| {
                media::name(code).map(|mime| {
                    if media::is_printable(code) {
                        format!("{mime}; charset=UTF-8")
                    } else {
                        mime.to_string()
                    }
                })
            })
            .unwrap_or_else(|| OCTET_STREAM.to_string());

        match split_charset(&raw) {
            Ok((mime, Some(charset))) => format!("{mime}; charset={charset}"),
            Ok((mime, None)) => mime.to_string(),
            Err(()) => OCTET_STREAM.to_string(),
        }
    }
}

/// Split `mime; charset=token` into its parts. A charset token that names no
/// known charset is an error; no charset parameter at all is fine.
fn split_charset(raw: &str) -> Result<(&str, Option<&'static str>), ()> {
    let mut pieces = raw.splitn(2, ';');
    let mime = pieces.next().unwrap_or("").trim();
    let Some(params) = pieces.next() else {
        return Ok((mime, None));
    };
    let Some(token) = params.trim().strip_prefix("charset=") else {
        return Ok((mime, None));
    };
    match canonical_charset(token.trim()) {
        Some(charset) => Ok((mime, Some(charset))),
        None => {
            tracing::debug!(charset = token, "Cannot convert charset token");
            Err(())
        }
    }
}

fn canonical_charset(token: &str) -> Option<&'static str> {
    match token.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Some("UTF-8"),
        "us-ascii" | "ascii" => Some("US-ASCII"),
        "iso-8859-1" | "latin1" => Some("ISO-8859-1"),
        _ => None,
    }
}

fn set_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::try_from(name),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => {
            tracing::warn!(header = name, value, "Skipping unrepresentable header");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coap::message::{response_code, CoapResponse};
    use crate::coap::option::CoapOption;

    fn translator() -> ResponseTranslator {
        ResponseTranslator::new(Arc::new(MappingTable::with_defaults()))
    }

    fn content(payload: &str) -> CoapResponse {
        CoapResponse::new(response_code::CONTENT).with_payload(payload)
    }

    #[test]
    fn status_maps_through_the_table() {
        let reply = translator()
            .translate(&CoapResponse::new(response_code::CREATED), &Method::POST)
            .unwrap();
        assert_eq!(reply.status, StatusCode::CREATED);
    }

    #[test]
    fn unmapped_code_is_fatal() {
        let out = translator().translate(&CoapResponse::new(255), &Method::GET);
        assert!(matches!(out, Err(TranslationError::Translation(_))));
    }

    #[test]
    fn etag_rendering_strips_two_and_quotes() {
        let resp = CoapResponse::new(response_code::CONTENT)
            .with_option(CoapOption::opaque(option::ETAG, vec![0xab, 0xcd]));
        let reply = translator().translate(&resp, &Method::GET).unwrap();
        assert_eq!(reply.headers.get("etag").unwrap(), "\"abcd\"");
    }

    #[test]
    fn max_age_renders_as_cache_control() {
        let resp = CoapResponse::new(response_code::CONTENT)
            .with_option(CoapOption::integer(option::MAX_AGE, 120));
        let reply = translator().translate(&resp, &Method::GET).unwrap();
        assert_eq!(reply.headers.get("cache-control").unwrap(), "max-age=120");
    }

    #[test]
    fn missing_cache_control_gets_default() {
        let reply = translator()
            .translate(&CoapResponse::new(response_code::CONTENT), &Method::GET)
            .unwrap();
        assert_eq!(reply.headers.get("cache-control").unwrap(), "max-age=60");
    }

    #[test]
    fn head_requests_carry_no_body() {
        let resp = content("payload")
            .with_option(CoapOption::integer(option::CONTENT_FORMAT, 0));
        let reply = translator().translate(&resp, &Method::HEAD).unwrap();
        assert!(reply.body.is_empty());
        assert!(reply.headers.get("content-type").is_none());
    }

    #[test]
    fn untyped_error_body_becomes_plain_text() {
        let resp = CoapResponse::new(response_code::NOT_FOUND).with_payload("missing");
        let reply = translator().translate(&resp, &Method::GET).unwrap();
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(
            reply.headers.get("content-type").unwrap(),
            "text/plain; charset=UTF-8"
        );
        assert_eq!(reply.body, b"missing");
    }

    #[test]
    fn untyped_success_body_stays_octet_stream() {
        let reply = translator().translate(&content("ok"), &Method::GET).unwrap();
        assert_eq!(
            reply.headers.get("content-type").unwrap(),
            "application/octet-stream"
        );
    }

    #[test]
    fn mapped_media_code_resolves_via_table() {
        let resp = content("{}")
            .with_option(CoapOption::integer(option::CONTENT_FORMAT, 50));
        let reply = translator().translate(&resp, &Method::GET).unwrap();
        assert_eq!(reply.headers.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn unknown_media_code_falls_back_to_octet_stream() {
        let resp = content("x")
            .with_option(CoapOption::integer(option::CONTENT_FORMAT, 9999));
        let reply = translator().translate(&resp, &Method::GET).unwrap();
        assert_eq!(
            reply.headers.get("content-type").unwrap(),
            "application/octet-stream"
        );
    }

    #[test]
    fn payload_bytes_pass_through_unmodified() {
        let bytes = vec![0x00, 0xff, 0x10, 0x7f];
        let resp = CoapResponse::new(response_code::CONTENT)
            .with_payload(bytes.clone())
            .with_option(CoapOption::integer(option::CONTENT_FORMAT, 42));
        let reply = translator().translate(&resp, &Method::GET).unwrap();
        assert_eq!(reply.body, bytes);
    }

    #[test]
    fn unmapped_options_are_dropped_silently() {
        let resp = CoapResponse::new(response_code::CONTENT)
            .with_option(CoapOption::integer(option::URI_PORT, 5683));
        let reply = translator().translate(&resp, &Method::GET).unwrap();
        // uri-port has no header mapping; only the injected cache-control
        assert_eq!(reply.headers.len(), 1);
    }

    #[test]
    fn location_options_map_to_location_header() {
        let resp = CoapResponse::new(response_code::CREATED)
            .with_option(CoapOption::string(option::LOCATION_PATH, "new/resource"));
        let reply = translator().translate(&resp, &Method::POST).unwrap();
        assert_eq!(reply.headers.get("location").unwrap(), "new/resource");
    }
}
