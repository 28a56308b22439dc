//! macOS cursor control by posting CoreGraphics mouse events
//!
//! Posting events requires the Accessibility permission for the terminal
//! (System Settings > Privacy & Security > Accessibility).

use crate::control::{CursorSink, SinkError};
use crate::debounce::ClickButton;
use crate::geometry::ScreenPoint;
use anyhow::Result;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

pub struct CgPointer;

impl CgPointer {
    pub fn new() -> Result<Self> {
        // Fail early if the event source cannot be created at all
        event_source()?;
        Ok(Self)
    }
}

fn event_source() -> Result<CGEventSource, SinkError> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|()| SinkError::AccessDenied("failed to create CGEventSource".into()))
}

fn post_mouse(event_type: CGEventType, at: CGPoint, button: CGMouseButton) -> Result<(), SinkError> {
    let event = CGEvent::new_mouse_event(event_source()?, event_type, at, button).map_err(|()| {
        SinkError::AccessDenied("failed to create mouse event (Accessibility permission?)".into())
    })?;
    event.post(CGEventTapLocation::HID);
    Ok(())
}

fn current_location() -> Result<CGPoint, SinkError> {
    let event = CGEvent::new(event_source()?)
        .map_err(|()| SinkError::AccessDenied("failed to read pointer location".into()))?;
    Ok(event.location())
}

impl CursorSink for CgPointer {
    fn move_to(&mut self, point: ScreenPoint) -> Result<(), SinkError> {
        let at = CGPoint::new(point.x as f64, point.y as f64);
        post_mouse(CGEventType::MouseMoved, at, CGMouseButton::Left)
    }

    fn click(&mut self, button: ClickButton) -> Result<(), SinkError> {
        let at = current_location()?;
        let (down, up, cg_button) = match button {
            ClickButton::Left => (
                CGEventType::LeftMouseDown,
                CGEventType::LeftMouseUp,
                CGMouseButton::Left,
            ),
            ClickButton::Right => (
                CGEventType::RightMouseDown,
                CGEventType::RightMouseUp,
                CGMouseButton::Right,
            ),
        };
        post_mouse(down, at, cg_button)?;
        post_mouse(up, at, cg_button)
    }

    fn position(&mut self) -> Result<ScreenPoint, SinkError> {
        let at = current_location()?;
        Ok(ScreenPoint::new(at.x.round() as i32, at.y.round() as i32))
    }
}
