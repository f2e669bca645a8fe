//! Bidirectional message translation.
//!
//! # Data Flow
//! ```text
//! HTTP request (method, headers, body, path)
//!     → request.rs (method code, option list, payload, Proxy-Uri)
//!     → [CoAP exchange, external]
//!     → response.rs (status line, headers, content-type, body)
//! ```
//!
//! # Design Decisions
//! - Header/option mapping is advisory: single-header faults are logged and
//!   skipped, never fatal
//! - Misrouted requests are an absent result, not an error
//! - All mapping decisions flow through the immutable MappingTable

pub mod error;
pub mod request;
pub mod response;

pub use error::TranslationError;
pub use request::RequestTranslator;
pub use response::{HttpReply, ResponseTranslator};
