//! Linux X11 support module
//!
//! Provides display enumeration and synthetic pointer input for X11.

pub mod display;
pub mod pointer;

// Re-export commonly used types
pub use display::{list_displays, DisplayInfo};
pub use pointer::X11Pointer;
