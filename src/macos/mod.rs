pub mod display;
pub mod pointer;

// Re-export commonly used types
pub use display::{list_displays, DisplayInfo};
pub use pointer::CgPointer;
