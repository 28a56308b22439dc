//! Cursor event types written to session logs

use crate::debounce::ClickButton;
use crate::geometry::ScreenPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Move,
    LeftClick,
    RightClick,
}

impl From<ClickButton> for EventType {
    fn from(button: ClickButton) -> Self {
        match button {
            ClickButton::Left => EventType::LeftClick,
            ClickButton::Right => EventType::RightClick,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorEvent {
    pub x: f64,
    pub y: f64,
    pub timestamp: f64,
    pub event_type: EventType,
}

impl CursorEvent {
    pub fn new(point: ScreenPoint, timestamp: f64, event_type: EventType) -> Self {
        Self {
            x: point.x as f64,
            y: point.y as f64,
            timestamp,
            event_type,
        }
    }
}
