//! Time-gated click emission
//!
//! A pinch is held across many frames, so without a cooldown a single
//! gesture would fire a click on every frame. The debouncer lets one click
//! through and then suppresses every request until the cooldown has elapsed.

use crate::classifier::ClickFlags;
use serde::{Deserialize, Serialize};

/// Slack for timestamps that are decimal in intent but not in binary
/// (`1.2 - 0.9` is just under `0.3`)
const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebounceState {
    Idle,
    /// A click was emitted at `since` (seconds)
    Cooldown { since: f64 },
}

pub struct ClickDebouncer {
    cooldown: f64,
    state: DebounceState,
}

impl ClickDebouncer {
    /// `cooldown` is in seconds and validated `>= 0` by the config layer
    pub fn new(cooldown: f64) -> Self {
        Self {
            cooldown,
            state: DebounceState::Idle,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = DebounceState::Idle;
    }

    /// Decide whether this frame's click request is emitted.
    ///
    /// Left wins when both pinches are held in the same frame.
    pub fn evaluate(&mut self, requested: ClickFlags, timestamp: f64) -> Option<ClickButton> {
        if let DebounceState::Cooldown { since } = self.state {
            // A clock that runs backwards reads as "not yet elapsed"
            if timestamp - since + TIME_EPSILON >= self.cooldown {
                self.state = DebounceState::Idle;
            }
        }

        if self.state != DebounceState::Idle {
            return None;
        }

        let button = if requested.left {
            ClickButton::Left
        } else if requested.right {
            ClickButton::Right
        } else {
            return None;
        };

        self.state = DebounceState::Cooldown { since: timestamp };
        Some(button)
    }
}
