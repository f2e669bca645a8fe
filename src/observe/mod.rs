//! Observe-mode bridge: CoAP server push served to HTTP polling.

pub mod bridge;

pub use bridge::{ObserveBridge, PollReading, SubscriptionState};
