//! Driving the OS cursor from frame gestures

use crate::debounce::ClickButton;
use crate::engine::FrameGesture;
use crate::geometry::ScreenPoint;
use std::fmt;

/// Pointer position that trips the failsafe (top-left corner)
pub const FAILSAFE_POINT: ScreenPoint = ScreenPoint { x: 0, y: 0 };

#[derive(Debug, Clone, PartialEq)]
pub enum SinkError {
    /// The platform refused synthetic input (permissions, lost display connection)
    AccessDenied(String),
    /// The pointer was parked on the failsafe corner
    FailSafe(ScreenPoint),
    /// No cursor backend for this platform
    Unsupported,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::AccessDenied(reason) => write!(f, "cursor control denied: {}", reason),
            SinkError::FailSafe(p) => {
                write!(f, "failsafe triggered: pointer at ({}, {})", p.x, p.y)
            }
            SinkError::Unsupported => {
                write!(f, "system cursor control is not supported on this platform")
            }
        }
    }
}

impl std::error::Error for SinkError {}

/// Something that can move and click the OS cursor
pub trait CursorSink {
    fn move_to(&mut self, point: ScreenPoint) -> Result<(), SinkError>;
    fn click(&mut self, button: ClickButton) -> Result<(), SinkError>;
    fn position(&mut self) -> Result<ScreenPoint, SinkError>;
}

/// Apply one frame gesture to the sink: move, then click if one was emitted.
///
/// `origin` is the top-left of the target display in desktop coordinates.
pub fn execute(
    gesture: &FrameGesture,
    sink: &mut dyn CursorSink,
    failsafe: bool,
    origin: ScreenPoint,
) -> Result<(), SinkError> {
    if failsafe {
        let current = sink.position()?;
        if current == FAILSAFE_POINT {
            return Err(SinkError::FailSafe(current));
        }
    }

    let cursor = gesture.result.cursor;
    sink.move_to(ScreenPoint::new(origin.x + cursor.x, origin.y + cursor.y))?;
    if let Some(button) = gesture.click {
        sink.click(button)?;
    }
    Ok(())
}

/// Caller-owned "system control enabled" capability
pub struct SystemControl {
    enabled: bool,
    failsafe: bool,
    origin: ScreenPoint,
}

impl SystemControl {
    pub fn new(enabled: bool, failsafe: bool) -> Self {
        Self {
            enabled,
            failsafe,
            origin: ScreenPoint::default(),
        }
    }

    /// Offset every move by the target display's position on the desktop
    pub fn with_origin(mut self, origin: ScreenPoint) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Execute the gesture if enabled. A sink failure disables control until
    /// `enable` is called again and is handed back to the caller.
    pub fn drive(
        &mut self,
        gesture: &FrameGesture,
        sink: &mut dyn CursorSink,
    ) -> Result<(), SinkError> {
        if !self.enabled {
            return Ok(());
        }
        execute(gesture, sink, self.failsafe, self.origin).map_err(|e| {
            self.enabled = false;
            e
        })
    }
}

/// Sink used on platforms without a cursor backend
#[cfg(any(test, not(any(target_os = "linux", target_os = "macos"))))]
pub struct UnsupportedSink;

#[cfg(any(test, not(any(target_os = "linux", target_os = "macos"))))]
impl CursorSink for UnsupportedSink {
    fn move_to(&mut self, _point: ScreenPoint) -> Result<(), SinkError> {
        Err(SinkError::Unsupported)
    }

    fn click(&mut self, _button: ClickButton) -> Result<(), SinkError> {
        Err(SinkError::Unsupported)
    }

    fn position(&mut self) -> Result<ScreenPoint, SinkError> {
        Err(SinkError::Unsupported)
    }
}

/// Open the platform cursor backend
#[cfg(target_os = "linux")]
pub fn open_system_sink() -> anyhow::Result<Box<dyn CursorSink>> {
    Ok(Box::new(crate::linux::X11Pointer::connect()?))
}

#[cfg(target_os = "macos")]
pub fn open_system_sink() -> anyhow::Result<Box<dyn CursorSink>> {
    Ok(Box::new(crate::macos::CgPointer::new()?))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn open_system_sink() -> anyhow::Result<Box<dyn CursorSink>> {
    Ok(Box::new(UnsupportedSink))
}
