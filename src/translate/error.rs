//! Translation failure taxonomy.
//!
//! Only structurally fatal conditions appear here; per-header mapping faults
//! are logged and skipped inside the translators. A misrouted request (path
//! outside the configured prefix) is not an error at all — translation
//! yields `Ok(None)` and the caller answers bad-gateway.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
    /// The HTTP method has no CoAP counterpart (surfaced as 501).
    #[error("method not mapped: {0}")]
    UnsupportedMethod(String),

    /// The embedded target address could not be decoded or parsed (400).
    #[error("malformed target uri: {0}")]
    MalformedUri(String),

    /// The request body could not be read in full (502).
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// Any other conversion fault, including a response code with no status
    /// mapping (502).
    #[error("translation failed: {0}")]
    Translation(String),
}
