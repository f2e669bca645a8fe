//! HTTP request → CoAP request translation.
//!
//! # Responsibilities
//! - Map method, embedded target address, headers and body onto a
//!   confirmable CoAP request
//! - Keep single-header faults local: log, skip, carry on
//!
//! # Design Decisions
//! - Only an unmapped method, a malformed target address or an unreadable
//!   body abort translation
//! - A path outside the proxy prefix yields `Ok(None)` (misrouted), distinct
//!   from every error
//! - Multi-valued accept negotiation narrows to the resolvable subset; the
//!   constrained side admits one preference per option

use std::sync::Arc;

use axum::http::{header, request::Parts, HeaderMap};

use crate::coap::media;
use crate::coap::message::CoapRequest;
use crate::coap::option::{self, CoapOption, OptionFormat};
use crate::mapping::{ns, MappingTable, UNSUPPORTED_MARKER};
use crate::translate::error::TranslationError;

/// Scheme prepended when the embedded address carries none.
const DEFAULT_SCHEME: &str = "coap://";

#[derive(Clone)]
pub struct RequestTranslator {
    table: Arc<MappingTable>,
}

impl RequestTranslator {
    pub fn new(table: Arc<MappingTable>) -> Self {
        Self { table }
    }

    /// Translate an inbound request. `Ok(None)` means the decoded path does
    /// not start with `proxy_prefix` — misrouted, the caller must answer
    /// bad-gateway itself.
    pub fn translate(
        &self,
        parts: &Parts,
        body: &[u8],
        proxy_prefix: &str,
    ) -> Result<Option<CoapRequest>, TranslationError> {
        let payload = read_payload(declared_length(&parts.headers), body)?;

        let method = parts.method.as_str().to_lowercase();
        let code_value = match self.table.lookup(ns::METHOD, &method) {
            Some(v) if !v.contains(UNSUPPORTED_MARKER) => v,
            _ => return Err(TranslationError::UnsupportedMethod(method)),
        };
        let code: u8 = code_value.trim().parse().map_err(|_| {
            TranslationError::Translation(format!("method code not numeric: {code_value}"))
        })?;

        let mut request = CoapRequest::new(code);

        let Some(target) = self.target_uri(parts.uri.path(), proxy_prefix)? else {
            return Ok(None);
        };
        request.add_option(CoapOption::string(option::PROXY_URI, target));

        for name in parts.headers.keys() {
            let header_name = name.as_str();

            // The constrained accept mechanism admits one preference per
            // request; multi-value negotiation headers are dropped wholesale.
            if header_name.starts_with("accept") && header_name != "accept" {
                continue;
            }

            let Some(value) = parts.headers.get(name).and_then(|v| v.to_str().ok()) else {
                tracing::warn!(header = header_name, "Skipping non-text header value");
                continue;
            };

            let Some(number) = self.table.option_number(header_name) else {
                continue;
            };

            match number {
                // handled with the payload
                option::CONTENT_FORMAT => continue,
                option::ACCEPT => self.translate_accept(&mut request, value),
                option::MAX_AGE => translate_cache_control(&mut request, value),
                _ => translate_generic(&mut request, header_name, number, value),
            }
        }

        let content_format = self.content_format_of(&parts.headers);
        request.add_option(CoapOption::integer(
            option::CONTENT_FORMAT,
            u32::from(content_format),
        ));
        request.payload = payload;

        tracing::debug!(
            method = %parts.method,
            code,
            options = request.options.len(),
            "Translated request"
        );
        Ok(Some(request))
    }

    /// Percent-decode the path, check the prefix, extract the embedded
    /// address and default its scheme.
    fn target_uri(
        &self,
        raw_path: &str,
        proxy_prefix: &str,
    ) -> Result<Option<String>, TranslationError> {
        let decoded = urlencoding::decode(raw_path)
            .map_err(|e| TranslationError::MalformedUri(e.to_string()))?;

        let Some(remainder) = decoded.strip_prefix(proxy_prefix) else {
            tracing::warn!(path = %decoded, prefix = proxy_prefix, "Misrouted request");
            return Ok(None);
        };

        let target = if remainder.starts_with("coap://") || remainder.starts_with("coaps://") {
            remainder.to_string()
        } else {
            format!("{DEFAULT_SCHEME}{remainder}")
        };

        url::Url::parse(&target)
            .map_err(|e| TranslationError::MalformedUri(format!("{target}: {e}")))?;
        Ok(Some(target))
    }

    /// Accept: strip the weight suffix, then one option per resolvable
    /// content-type token.
    fn translate_accept(&self, request: &mut CoapRequest, value: &str) {
        let unweighted = value.trim().split(';').next().unwrap_or("").trim();
        for token in unweighted.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let codes: Vec<u16> = if token.contains('*') {
                media::parse_wildcard(token)
            } else {
                self.table
                    .media_code(token)
                    .or_else(|| media::parse(token))
                    .into_iter()
                    .collect()
            };
            if codes.is_empty() {
                tracing::debug!(token, "No media code for accept token");
            }
            for code in codes {
                request.add_option(CoapOption::integer(option::ACCEPT, u32::from(code)));
            }
        }
    }

    /// Content-Format: direct mapping, parser fallback, octet-stream last.
    fn content_format_of(&self, headers: &HeaderMap) -> u16 {
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|ct| {
                let bare = ct.split(';').next().unwrap_or("").trim();
                self.table.media_code(bare).or_else(|| media::parse(bare))
            })
            .unwrap_or(media::APPLICATION_OCTET_STREAM)
    }
}

/// Cache-Control: `no-cache` forces 0; otherwise the first `max-age=N`
/// directive wins and an unparsable N stops the scan. Exactly one option is
/// always emitted.
fn translate_cache_control(request: &mut CoapRequest, value: &str) {
    let mut max_age: u32 = 0;
    if !value.contains("no-cache") {
        for directive in value.split(',') {
            let directive = directive.trim();
            if let Some(rest) = directive.strip_prefix("max-age") {
                let candidate = rest.trim_start_matches('=').trim();
                match candidate.parse::<u32>() {
                    Ok(v) => max_age = v,
                    Err(_) => {
                        tracing::warn!(directive, "Cannot convert cache-control to max-age");
                    }
                }
                break;
            }
        }
    }
    request.add_option(CoapOption::integer(option::MAX_AGE, max_age));
}

/// Everything else: encode per the option's declared format. An integer
/// parse failure is local to this header.
fn translate_generic(request: &mut CoapRequest, header_name: &str, number: u16, value: &str) {
    let value = value.trim();
    match option::format_of(number) {
        OptionFormat::Integer => match value.parse::<u32>() {
            Ok(v) => request.add_option(CoapOption::integer(number, v)),
            Err(_) => {
                tracing::warn!(header = header_name, value, "Skipping non-integer header");
            }
        },
        OptionFormat::Opaque => {
            request.add_option(CoapOption::opaque(number, value.as_bytes().to_vec()));
        }
        _ => request.add_option(CoapOption::string(number, value)),
    }
}

fn declared_length(headers: &HeaderMap) -> i64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(-1)
}

/// Declared length ≤ 0 means no payload; a short read is fatal.
fn read_payload(declared: i64, body: &[u8]) -> Result<Option<Vec<u8>>, TranslationError> {
    if declared <= 0 {
        return Ok(None);
    }
    let declared = declared as usize;
    if body.len() < declared {
        return Err(TranslationError::BodyRead(format!(
            "declared {declared} bytes, read {}",
            body.len()
        )));
    }
    Ok(Some(body[..declared].to_vec()))
}
