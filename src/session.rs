use crate::config::TrackingConfig;
use crate::cursor_types::{CursorEvent, EventType};
use crate::engine::FrameGesture;
use crate::geometry::ScreenSize;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything the engine emitted during one tracking or replay run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLog {
    pub screen: ScreenSize,
    pub tracking: TrackingConfig,
    /// Frames read from the source, with or without a hand
    pub frame_count: u64,
    /// Seconds from the first to the last frame
    #[serde(default)]
    pub duration: f64,
    pub cursor_events: Vec<CursorEvent>,
}

impl SessionLog {
    pub fn new(screen: ScreenSize, tracking: TrackingConfig) -> Self {
        Self {
            screen,
            tracking,
            frame_count: 0,
            duration: 0.0,
            cursor_events: Vec::new(),
        }
    }

    pub fn record(&mut self, gesture: &FrameGesture) {
        self.cursor_events.extend(gesture.events());
    }

    pub fn count_events(&self, event_type: EventType) -> usize {
        self.cursor_events
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write session log to {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
impl SessionLog {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session log from {:?}", path))?;
        let log: Self = serde_json::from_str(&json)?;
        Ok(log)
    }
}
