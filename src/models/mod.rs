pub mod table;

pub use table::*;

/// Placeholder glyph shown for absent / null / empty cell values.
pub const EMPTY_CELL: &str = "—";
