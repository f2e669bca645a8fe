//! Static translation mapping table.

pub mod table;

pub use table::{ns, MappingTable, UNSUPPORTED_MARKER};
