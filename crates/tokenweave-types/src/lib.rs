// ABOUTME: Pure data types with no cross-crate dependencies
// ABOUTME: Foundation layer for all other tokenweave crates

pub mod level;
pub mod mode;
pub mod reference;
pub mod role;

// Re-export commonly used types
pub use level::ScaleLevel;
pub use mode::Mode;
pub use reference::{CssVarRef, ParsedRef, TokenPath};
pub use role::{ColorRole, Direction, Emphasis};
