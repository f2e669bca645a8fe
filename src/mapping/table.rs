//! Static HTTP ⇄ CoAP mapping table.
//!
//! # Responsibilities
//! - Hold the namespaced key/value pairs driving method, status, header,
//!   option and content-type translation
//! - Serve lookups from any number of threads without locking
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Lookups return `None` for absent keys; callers decide per call site
//!   whether an absence is fatal
//! - The flat `key = value` file format and its seven namespaces are a
//!   compatibility surface and must not change

use std::collections::HashMap;

/// Key namespaces. Every table key starts with exactly one of these.
pub mod ns {
    /// HTTP method token → CoAP method code (or an `error` marker).
    pub const METHOD: &str = "http.request.method.";
    /// HTTP header name → CoAP option number.
    pub const HEADER: &str = "http.message.header.";
    /// HTTP content-type → CoAP media code.
    pub const CONTENT_TYPE: &str = "http.message.content-type.";
    /// CoAP media code → HTTP content-type.
    pub const MEDIA: &str = "coap.message.media.";
    /// CoAP response code → HTTP status code.
    pub const COAP_CODE: &str = "coap.response.code.";
    /// HTTP status code → CoAP response code.
    pub const HTTP_CODE: &str = "http.response.code.";
    /// CoAP option number → HTTP header name.
    pub const OPTION: &str = "coap.message.option.";
}

/// Marker value naming a method the constrained protocol cannot express.
pub const UNSUPPORTED_MARKER: &str = "error";

const DEFAULTS: &str = include_str!("default.properties");

/// Immutable namespaced lookup table, loaded once at startup.
#[derive(Debug, Clone)]
pub struct MappingTable {
    entries: HashMap<String, String>,
}

impl MappingTable {
    /// The compiled-in default table.
    pub fn with_defaults() -> Self {
        let mut table = Self {
            entries: HashMap::new(),
        };
        table.absorb(DEFAULTS);
        table
    }

    /// Defaults overlaid with entries from a mapping file's text.
    pub fn with_overrides(text: &str) -> Self {
        let mut table = Self::with_defaults();
        table.absorb(text);
        table
    }

    fn absorb(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                self.entries
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    /// Look up `<namespace><key>`. Never panics; absent keys yield `None`.
    pub fn lookup(&self, namespace: &str, key: &str) -> Option<&str> {
        self.entries
            .get(&format!("{namespace}{key}"))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// CoAP option number mapped from an HTTP header name.
    pub fn option_number(&self, header: &str) -> Option<u16> {
        self.lookup(ns::HEADER, header)?.parse().ok()
    }

    /// HTTP header name mapped from a CoAP option number.
    pub fn header_name(&self, number: u16) -> Option<&str> {
        self.lookup(ns::OPTION, &number.to_string())
    }

    /// HTTP status code mapped from a CoAP response code.
    pub fn status_for(&self, coap_code: u8) -> Option<u16> {
        self.lookup(ns::COAP_CODE, &coap_code.to_string())?
            .parse()
            .ok()
    }

    /// CoAP media code mapped from a bare HTTP content-type.
    pub fn media_code(&self, content_type: &str) -> Option<u16> {
        self.lookup(ns::CONTENT_TYPE, content_type)?.parse().ok()
    }

    /// HTTP content-type string mapped from a CoAP media code.
    pub fn media_name(&self, code: u16) -> Option<&str> {
        self.lookup(ns::MEDIA, &code.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_namespaces() {
        let table = MappingTable::with_defaults();
        assert_eq!(table.lookup(ns::METHOD, "get"), Some("1"));
        assert_eq!(table.lookup(ns::METHOD, "options"), Some("error"));
        assert_eq!(table.status_for(69), Some(200));
        assert_eq!(table.option_number("cache-control"), Some(14));
        assert_eq!(table.header_name(4), Some("etag"));
        assert_eq!(table.media_code("application/json"), Some(50));
        assert_eq!(table.media_name(0), Some("text/plain; charset=utf-8"));
        assert_eq!(table.lookup(ns::HTTP_CODE, "404"), Some("132"));
    }

    #[test]
    fn lookups_never_fail_on_absent_keys() {
        let table = MappingTable::with_defaults();
        assert_eq!(table.lookup(ns::METHOD, "patch"), None);
        assert_eq!(table.status_for(255), None);
    }

    #[test]
    fn overrides_shadow_defaults_entry_by_entry() {
        let table = MappingTable::with_overrides(
            "# local site table\ncoap.response.code.69 = 203\nhttp.request.method.patch = 2\n",
        );
        assert_eq!(table.status_for(69), Some(203));
        assert_eq!(table.lookup(ns::METHOD, "patch"), Some("2"));
        // untouched defaults survive
        assert_eq!(table.lookup(ns::METHOD, "get"), Some("1"));
    }

    #[test]
    fn blank_values_read_as_absent() {
        let table = MappingTable::with_overrides("http.message.header.etag =\n");
        assert_eq!(table.option_number("etag"), None);
    }
}
