//! Per-frame gesture pipeline: map, classify, debounce

use crate::classifier::GestureClassifier;
use crate::config::{validate_screen, ConfigError, TrackingConfig};
use crate::cursor_types::{CursorEvent, EventType};
use crate::debounce::{ClickButton, ClickDebouncer};
use crate::geometry::{ScreenPoint, ScreenSize};
use crate::landmarks::HandLandmarks;
use crate::mapper::CoordinateMapper;

/// Raw per-frame decision: where the cursor goes and which pinches are held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureResult {
    pub cursor: ScreenPoint,
    pub left_click: bool,
    pub right_click: bool,
}

/// A gesture plus the click the debouncer let through this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGesture {
    pub timestamp: f64,
    pub result: GestureResult,
    pub click: Option<ClickButton>,
}

impl FrameGesture {
    /// Session log entries for this frame: the move, then the click if any
    pub fn events(&self) -> Vec<CursorEvent> {
        let mut events = vec![CursorEvent::new(
            self.result.cursor,
            self.timestamp,
            EventType::Move,
        )];
        if let Some(button) = self.click {
            events.push(CursorEvent::new(
                self.result.cursor,
                self.timestamp,
                button.into(),
            ));
        }
        events
    }
}

pub struct GestureEngine {
    mapper: CoordinateMapper,
    classifier: GestureClassifier,
    debouncer: ClickDebouncer,
    min_confidence: f64,
    mirror: bool,
}

impl GestureEngine {
    pub fn new(config: &TrackingConfig, screen: ScreenSize) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_screen(screen)?;

        Ok(Self {
            mapper: CoordinateMapper::new(screen, config.sensitivity, config.smoothing),
            classifier: GestureClassifier::new(
                config.left_click_threshold,
                config.right_click_threshold,
            ),
            debouncer: ClickDebouncer::new(config.click_cooldown),
            min_confidence: config.min_confidence,
            mirror: config.mirror,
        })
    }

    /// Process one frame. `None` means "no gesture": no usable hand was seen
    /// and no state changed.
    pub fn process(&mut self, hand: Option<&HandLandmarks>, timestamp: f64) -> Option<FrameGesture> {
        let hand = hand?;
        if !hand.is_complete() {
            log::warn!(
                "Ignoring hand with {} landmarks at {:.3}s",
                hand.landmarks.len(),
                timestamp
            );
            return None;
        }
        if hand.score < self.min_confidence {
            log::trace!("Hand score {:.2} below threshold", hand.score);
            return None;
        }

        let mirrored;
        let hand = if self.mirror {
            mirrored = hand.mirrored();
            &mirrored
        } else {
            hand
        };

        let cursor = self.mapper.map(hand.index_tip());
        let flags = self
            .classifier
            .classify(hand.index_tip(), hand.thumb_tip(), hand.middle_tip());
        let click = self.debouncer.evaluate(flags, timestamp);

        if let Some(button) = click {
            log::debug!("{:?} click at ({}, {}) t={:.3}s", button, cursor.x, cursor.y, timestamp);
        } else if flags.any() {
            log::trace!("Pinch suppressed, debouncer {:?}", self.debouncer.state());
        }

        Some(FrameGesture {
            timestamp,
            result: GestureResult {
                cursor,
                left_click: flags.left,
                right_click: flags.right,
            },
            click,
        })
    }

    /// Forget the previous cursor position and any pending cooldown
    pub fn reset(&mut self) {
        log::debug!("Resetting engine, last cursor {:?}", self.mapper.state().previous);
        self.mapper.reset();
        self.debouncer.reset();
    }
}
