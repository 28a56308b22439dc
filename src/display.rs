//! Platform display enumeration and target screen selection

use crate::config::ScreenConfig;
use crate::geometry::{ScreenPoint, ScreenSize};
use anyhow::Result;

#[cfg(target_os = "linux")]
pub use crate::linux::{list_displays, DisplayInfo};
#[cfg(target_os = "macos")]
pub use crate::macos::{list_displays, DisplayInfo};

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub struct DisplayInfo {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub is_main: bool,
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn list_displays() -> Result<Vec<DisplayInfo>> {
    anyhow::bail!("Display enumeration is not supported on this platform; pass --screen WxH")
}

/// Screen area the cursor is mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetScreen {
    pub size: ScreenSize,
    /// Top-left of the display in desktop coordinates
    pub origin: ScreenPoint,
}

/// Pick the mapping target: an explicit size wins, otherwise the requested
/// display, otherwise the main display.
pub fn resolve_target(screen: &ScreenConfig) -> Result<TargetScreen> {
    if let Some(size) = screen.size() {
        return Ok(TargetScreen {
            size,
            origin: ScreenPoint::default(),
        });
    }

    let displays = list_displays()?;
    let display = match screen.display {
        Some(index) => displays
            .into_iter()
            .find(|d| d.index == index)
            .ok_or_else(|| anyhow::anyhow!("Display {} not found", index))?,
        None => displays
            .into_iter()
            .find(|d| d.is_main)
            .ok_or_else(|| anyhow::anyhow!("No display found; pass --screen WxH"))?,
    };

    Ok(TargetScreen {
        size: ScreenSize::new(display.width, display.height),
        origin: ScreenPoint::new(display.x, display.y),
    })
}
