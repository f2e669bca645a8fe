//! CoAP option numbers, typed values and the number → format registry.
//!
//! # Responsibilities
//! - Define the option numbers the gateway translates (RFC 7252 / RFC 7641)
//! - Carry option values in their wire-level type (integer, opaque, string)
//! - Resolve an option number to its declared value format
//!
//! # Design Decisions
//! - Values keep their typed representation; encoding to text happens only
//!   at the HTTP boundary
//! - Unknown option numbers are treated as strings on the request path and
//!   skipped on the response path

/// If-Match (opaque).
pub const IF_MATCH: u16 = 1;
/// Uri-Host (string).
pub const URI_HOST: u16 = 3;
/// ETag (opaque).
pub const ETAG: u16 = 4;
/// If-None-Match (empty).
pub const IF_NONE_MATCH: u16 = 5;
/// Observe (integer, RFC 7641).
pub const OBSERVE: u16 = 6;
/// Uri-Port (integer).
pub const URI_PORT: u16 = 7;
/// Location-Path (string).
pub const LOCATION_PATH: u16 = 8;
/// Uri-Path (string).
pub const URI_PATH: u16 = 11;
/// Content-Format (integer).
pub const CONTENT_FORMAT: u16 = 12;
/// Max-Age (integer).
pub const MAX_AGE: u16 = 14;
/// Uri-Query (string).
pub const URI_QUERY: u16 = 15;
/// Accept (integer).
pub const ACCEPT: u16 = 17;
/// Location-Query (string).
pub const LOCATION_QUERY: u16 = 20;
/// Proxy-Uri (string).
pub const PROXY_URI: u16 = 35;
/// Proxy-Scheme (string).
pub const PROXY_SCHEME: u16 = 39;
/// Size1 (integer).
pub const SIZE1: u16 = 60;

/// Default Max-Age when a response carries none (RFC 7252 §5.10.5).
pub const DEFAULT_MAX_AGE: u32 = 60;

/// Declared value format of an option number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionFormat {
    Integer,
    Opaque,
    String,
    Empty,
    Unknown,
}

/// Look up the declared format for an option number.
pub fn format_of(number: u16) -> OptionFormat {
    match number {
        OBSERVE | URI_PORT | CONTENT_FORMAT | MAX_AGE | ACCEPT | SIZE1 => OptionFormat::Integer,
        IF_MATCH | ETAG => OptionFormat::Opaque,
        URI_HOST | LOCATION_PATH | URI_PATH | URI_QUERY | LOCATION_QUERY | PROXY_URI
        | PROXY_SCHEME => OptionFormat::String,
        IF_NONE_MATCH => OptionFormat::Empty,
        _ => OptionFormat::Unknown,
    }
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Integer(u32),
    Opaque(Vec<u8>),
    String(String),
    Empty,
}

/// A CoAP option: (number, typed value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapOption {
    pub number: u16,
    pub value: OptionValue,
}

impl CoapOption {
    pub fn integer(number: u16, value: u32) -> Self {
        Self {
            number,
            value: OptionValue::Integer(value),
        }
    }

    pub fn opaque(number: u16, value: impl Into<Vec<u8>>) -> Self {
        Self {
            number,
            value: OptionValue::Opaque(value.into()),
        }
    }

    pub fn string(number: u16, value: impl Into<String>) -> Self {
        Self {
            number,
            value: OptionValue::String(value.into()),
        }
    }

    /// Value as an integer, converting across representations where the
    /// bytes admit it.
    pub fn integer_value(&self) -> Option<u32> {
        match &self.value {
            OptionValue::Integer(v) => Some(*v),
            OptionValue::String(s) => s.parse().ok(),
            OptionValue::Opaque(bytes) if bytes.len() <= 4 => {
                let mut v: u32 = 0;
                for b in bytes {
                    v = (v << 8) | u32::from(*b);
                }
                Some(v)
            }
            _ => None,
        }
    }

    /// Value as a UTF-8 string (lossy for opaque bytes).
    pub fn string_value(&self) -> String {
        match &self.value {
            OptionValue::String(s) => s.clone(),
            OptionValue::Integer(v) => v.to_string(),
            OptionValue::Opaque(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            OptionValue::Empty => String::new(),
        }
    }

    /// Canonical textual rendering of an opaque value: `0x` followed by the
    /// lowercase hex digits.
    pub fn opaque_string(&self) -> String {
        match &self.value {
            OptionValue::Opaque(bytes) => format!("0x{}", hex::encode(bytes)),
            other => format!("0x{}", hex::encode(render_raw(other))),
        }
    }
}

fn render_raw(value: &OptionValue) -> Vec<u8> {
    match value {
        OptionValue::Opaque(bytes) => bytes.clone(),
        OptionValue::String(s) => s.as_bytes().to_vec(),
        OptionValue::Integer(v) => v.to_be_bytes().iter().skip_while(|b| **b == 0).copied().collect(),
        OptionValue::Empty => Vec::new(),
    }
}

/// Sort options by number, preserving insertion order within a number.
pub fn sorted(options: &[CoapOption]) -> Vec<CoapOption> {
    let mut out = options.to_vec();
    out.sort_by_key(|o| o.number);
    out
}
