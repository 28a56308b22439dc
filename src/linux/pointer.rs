//! Linux X11 cursor control using the XTEST extension

use crate::control::{CursorSink, SinkError};
use crate::debounce::ClickButton;
use crate::geometry::ScreenPoint;
use anyhow::{Context, Result};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    ConnectionExt, Window, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT, MOTION_NOTIFY_EVENT,
};
use x11rb::protocol::xtest::ConnectionExt as XTestExt;
use x11rb::rust_connection::RustConnection;

// Core X11 button numbers
const BUTTON_LEFT: u8 = 1;
const BUTTON_RIGHT: u8 = 3;

pub struct X11Pointer {
    conn: RustConnection,
    root: Window,
}

impl X11Pointer {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) =
            RustConnection::connect(None).context("Failed to connect to X11 display")?;

        conn.xtest_get_version(2, 2)
            .context("Failed to query XTEST extension")?
            .reply()
            .context("XTEST extension is not available on this X server")?;

        let root = conn.setup().roots[screen_num].root;
        log::debug!("XTEST pointer ready on screen {}", screen_num);

        Ok(Self { conn, root })
    }

    fn fake_input(&self, event_type: u8, detail: u8, x: i16, y: i16) -> Result<(), SinkError> {
        self.conn
            .xtest_fake_input(event_type, detail, x11rb::CURRENT_TIME, self.root, x, y, 0)
            .map_err(denied)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.conn.flush().map_err(denied)
    }
}

fn denied(e: impl std::fmt::Display) -> SinkError {
    SinkError::AccessDenied(e.to_string())
}

fn to_coord(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

impl CursorSink for X11Pointer {
    fn move_to(&mut self, point: ScreenPoint) -> Result<(), SinkError> {
        // detail 0 = absolute motion relative to the root window
        self.fake_input(MOTION_NOTIFY_EVENT, 0, to_coord(point.x), to_coord(point.y))?;
        self.flush()
    }

    fn click(&mut self, button: ClickButton) -> Result<(), SinkError> {
        let detail = match button {
            ClickButton::Left => BUTTON_LEFT,
            ClickButton::Right => BUTTON_RIGHT,
        };
        self.fake_input(BUTTON_PRESS_EVENT, detail, 0, 0)?;
        self.fake_input(BUTTON_RELEASE_EVENT, detail, 0, 0)?;
        self.flush()
    }

    fn position(&mut self) -> Result<ScreenPoint, SinkError> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .map_err(denied)?
            .reply()
            .map_err(denied)?;
        Ok(ScreenPoint::new(reply.root_x as i32, reply.root_y as i32))
    }
}
