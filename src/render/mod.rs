pub mod classify;
pub mod format;
pub mod html;
pub mod order;
pub mod table;

pub use classify::*;
pub use format::*;
pub use order::*;
pub use table::*;
