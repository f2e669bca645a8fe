//! HTTP front end.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, prefix routes, middleware)
//!     → request.rs (request ID)
//!     → dispatch.rs (direct mode: translate → exchange → translate back)
//!       or observe::bridge (observe mode: cached snapshot)
//!     → reply to client
//! ```

pub mod dispatch;
pub mod request;
pub mod server;

pub use dispatch::Dispatcher;
pub use request::{RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
