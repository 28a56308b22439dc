use anyhow::Result;
use core_graphics::display::CGDisplay;

pub struct DisplayInfo {
    pub index: usize,
    /// Width in points; synthetic mouse events use the same space
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub is_main: bool,
}

pub fn list_displays() -> Result<Vec<DisplayInfo>> {
    let cg_displays = CGDisplay::active_displays()
        .map_err(|e| anyhow::anyhow!("Failed to get displays: {:?}", e))?;

    let mut displays = Vec::new();

    for (index, cg_id) in cg_displays.iter().enumerate() {
        let display = CGDisplay::new(*cg_id);
        let bounds = display.bounds();

        displays.push(DisplayInfo {
            index,
            width: bounds.size.width as u32,
            height: bounds.size.height as u32,
            x: bounds.origin.x as i32,
            y: bounds.origin.y as i32,
            is_main: display.is_main(),
        });
    }

    Ok(displays)
}
