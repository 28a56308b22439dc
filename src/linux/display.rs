//! Linux X11 display enumeration using RandR extension

use anyhow::{Context, Result};
use x11rb::connection::Connection;
use x11rb::protocol::randr::{self, ConnectionExt as RandrExt};
use x11rb::rust_connection::RustConnection;

pub struct DisplayInfo {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub is_main: bool,
}

pub fn list_displays() -> Result<Vec<DisplayInfo>> {
    let (conn, screen_num) =
        RustConnection::connect(None).context("Failed to connect to X11 display")?;

    let setup = conn.setup();
    let screen = &setup.roots[screen_num];
    let root = screen.root;

    let resources = conn
        .randr_get_screen_resources(root)
        .context("Failed to query RandR screen resources")?
        .reply()
        .context("Failed to get RandR screen resources reply")?;

    // The primary output marks the main display; 0 means none is set
    let primary = conn
        .randr_get_output_primary(root)
        .ok()
        .and_then(|cookie| cookie.reply().ok())
        .map(|reply| reply.output)
        .unwrap_or(0);

    let mut displays = Vec::new();

    for crtc in &resources.crtcs {
        let crtc_info = conn
            .randr_get_crtc_info(*crtc, resources.config_timestamp)
            .context("Failed to query CRTC info")?
            .reply()
            .context("Failed to get CRTC info reply")?;

        // Skip disabled CRTCs
        if crtc_info.outputs.is_empty() || crtc_info.width == 0 || crtc_info.height == 0 {
            continue;
        }

        let has_connected_output = crtc_info.outputs.iter().any(|output| {
            conn.randr_get_output_info(*output, resources.config_timestamp)
                .ok()
                .and_then(|cookie| cookie.reply().ok())
                .map(|info| info.connection == randr::Connection::CONNECTED)
                .unwrap_or(false)
        });

        if !has_connected_output {
            continue;
        }

        displays.push(DisplayInfo {
            index: displays.len(),
            width: crtc_info.width as u32,
            height: crtc_info.height as u32,
            x: crtc_info.x as i32,
            y: crtc_info.y as i32,
            is_main: crtc_info.outputs.contains(&primary),
        });
    }

    if !displays.is_empty() && !displays.iter().any(|d| d.is_main) {
        displays[0].is_main = true;
    }

    // No RandR monitors: fall back to the root screen
    if displays.is_empty() {
        displays.push(DisplayInfo {
            index: 0,
            width: screen.width_in_pixels as u32,
            height: screen.height_in_pixels as u32,
            x: 0,
            y: 0,
            is_main: true,
        });
    }

    Ok(displays)
}
