//! CoAP content-format registry.
//!
//! Maps the small integer content-format codes to their canonical MIME
//! strings, supports wildcard matching for Accept translation, and knows
//! which formats are printable text (those get a charset suffix on the
//! HTTP side).

/// text/plain.
pub const TEXT_PLAIN: u16 = 0;
/// application/link-format.
pub const APPLICATION_LINK_FORMAT: u16 = 40;
/// application/xml.
pub const APPLICATION_XML: u16 = 41;
/// application/octet-stream.
pub const APPLICATION_OCTET_STREAM: u16 = 42;
/// application/exi.
pub const APPLICATION_EXI: u16 = 47;
/// application/json.
pub const APPLICATION_JSON: u16 = 50;

/// (code, canonical MIME string, printable).
const REGISTRY: &[(u16, &str, bool)] = &[
    (TEXT_PLAIN, "text/plain", true),
    (APPLICATION_LINK_FORMAT, "application/link-format", true),
    (APPLICATION_XML, "application/xml", true),
    (APPLICATION_OCTET_STREAM, "application/octet-stream", false),
    (APPLICATION_EXI, "application/exi", false),
    (APPLICATION_JSON, "application/json", true),
];

/// Canonical MIME string for a code.
pub fn name(code: u16) -> Option<&'static str> {
    REGISTRY
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, mime, _)| *mime)
}

/// Whether the format carries printable text (drives charset suffixing).
pub fn is_printable(code: u16) -> bool {
    REGISTRY
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, printable)| *printable)
        .unwrap_or(false)
}

/// Parse a bare MIME string (no parameters) into a code.
pub fn parse(mime: &str) -> Option<u16> {
    let wanted = mime.trim().to_ascii_lowercase();
    REGISTRY
        .iter()
        .find(|(_, m, _)| *m == wanted)
        .map(|(c, _, _)| *c)
}

/// Resolve a MIME pattern that may contain `*` wildcards to every matching
/// registered code. `*/*` matches everything; `text/*` matches by type.
pub fn parse_wildcard(pattern: &str) -> Vec<u16> {
    let wanted = pattern.trim().to_ascii_lowercase();
    let Some((wtype, wsub)) = wanted.split_once('/') else {
        return Vec::new();
    };
    REGISTRY
        .iter()
        .filter(|(_, mime, _)| {
            let (mtype, msub) = mime.split_once('/').unwrap_or((*mime, ""));
            (wtype == "*" || wtype == mtype) && (wsub == "*" || wsub == msub)
        })
        .map(|(c, _, _)| *c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_types() {
        assert_eq!(parse("text/plain"), Some(TEXT_PLAIN));
        assert_eq!(parse("Application/JSON"), Some(APPLICATION_JSON));
        assert_eq!(parse("image/png"), None);
    }

    #[test]
    fn wildcard_matches_by_type() {
        assert_eq!(parse_wildcard("text/*"), vec![TEXT_PLAIN]);

        let all = parse_wildcard("*/*");
        assert_eq!(all.len(), REGISTRY.len());

        assert!(parse_wildcard("image/*").is_empty());
        assert!(parse_wildcard("garbage").is_empty());
    }

    #[test]
    fn printable_formats_get_charsets() {
        assert!(is_printable(TEXT_PLAIN));
        assert!(is_printable(APPLICATION_JSON));
        assert!(!is_printable(APPLICATION_OCTET_STREAM));
        assert!(!is_printable(9999));
    }
}
