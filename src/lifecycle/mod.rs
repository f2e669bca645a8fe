//! Lifecycle management subsystem.
//!
//! # Design Decisions
//! - Ordered startup: config first, then mapping table and upstream, then
//!   the listener
//! - Shutdown fans out over a broadcast channel; in-flight exchanges are
//!   cancelled rather than drained to completion

pub mod shutdown;

pub use shutdown::Shutdown;
