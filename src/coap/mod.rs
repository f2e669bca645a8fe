//! CoAP domain model and the transport seam.
//!
//! # Data Flow
//! ```text
//! translate::request
//!     → message.rs (CoapRequest: code, options, payload, Proxy-Uri)
//!     → client.rs (CoapExchange collaborator performs the exchange)
//!     → message.rs (CoapResponse)
//!     → translate::response
//!
//! Registries (read-only):
//!     option.rs — option numbers and value formats
//!     media.rs  — content-format codes and MIME strings
//! ```

pub mod client;
pub mod loopback;
pub mod media;
pub mod message;
pub mod option;

pub use client::{CoapExchange, ExchangeError, NotificationHandler};
pub use message::{CoapRequest, CoapResponse};
pub use option::{CoapOption, OptionValue};
