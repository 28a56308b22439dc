//! Hand landmark types as produced by an external hand-landmark detector
//!
//! Indices follow the MediaPipe hand model: 21 points per hand, normalized to
//! the camera image (x to the right, y downwards).

use crate::geometry::NormalizedPoint;
use serde::{Deserialize, Serialize};

/// Landmark indices used by the gesture engine
pub mod index {
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_TIP: usize = 12;
}

pub const LANDMARK_COUNT: usize = 21;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Depth relative to the wrist; unused by the mapping
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn point(&self) -> NormalizedPoint {
        NormalizedPoint::new(self.x, self.y)
    }
}

fn default_score() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub landmarks: Vec<Landmark>,
    /// Detector confidence (0.0 to 1.0); detectors that omit it are trusted
    #[serde(default = "default_score")]
    pub score: f64,
    #[serde(default)]
    pub handedness: Option<String>,
}

impl HandLandmarks {
    /// A hand is usable only if the detector reported the full landmark set
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }

    fn at(&self, idx: usize) -> NormalizedPoint {
        self.landmarks
            .get(idx)
            .map(Landmark::point)
            .unwrap_or_default()
    }

    pub fn thumb_tip(&self) -> NormalizedPoint {
        self.at(index::THUMB_TIP)
    }

    pub fn index_tip(&self) -> NormalizedPoint {
        self.at(index::INDEX_FINGER_TIP)
    }

    pub fn middle_tip(&self) -> NormalizedPoint {
        self.at(index::MIDDLE_FINGER_TIP)
    }

    /// Flip horizontally, as if the camera image had been mirrored
    pub fn mirrored(&self) -> Self {
        Self {
            landmarks: self
                .landmarks
                .iter()
                .map(|lm| Landmark {
                    x: 1.0 - lm.x,
                    ..*lm
                })
                .collect(),
            score: self.score,
            handedness: self.handedness.clone(),
        }
    }
}

/// One detector output: zero or more hands seen in a camera frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds since the start of the stream; stamped by the source if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
    /// Error reported by the detector for this frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Frame {
    /// The tracked hand: only the first detection is used
    pub fn primary_hand(&self) -> Option<&HandLandmarks> {
        self.hands.first()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::make_hand;
    use super::*;

    #[test]
    fn test_parse_detector_frame() {
        let json = r#"{"timestamp": 0.5, "hands": [{"handedness": "Right", "score": 0.93,
            "landmarks": [{"x": 0.1, "y": 0.2, "z": -0.01}]}]}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.timestamp, Some(0.5));
        let hand = frame.primary_hand().unwrap();
        assert_eq!(hand.handedness.as_deref(), Some("Right"));
        assert!((hand.score - 0.93).abs() < 1e-9);
        assert!(!hand.is_complete());
    }

    #[test]
    fn test_missing_score_defaults_to_trusted() {
        let json = r#"{"hands": [{"landmarks": []}]}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.timestamp, None);
        assert_eq!(frame.hands[0].score, 1.0);
    }

    #[test]
    fn test_empty_frame_has_no_hand() {
        let frame: Frame = serde_json::from_str(r#"{"hands": []}"#).unwrap();
        assert!(frame.primary_hand().is_none());
    }

    #[test]
    fn test_fingertip_accessors() {
        let hand = make_hand((0.5, 0.4), (0.52, 0.42), (0.3, 0.3));
        assert!(hand.is_complete());
        assert_eq!(hand.index_tip(), NormalizedPoint::new(0.5, 0.4));
        assert_eq!(hand.thumb_tip(), NormalizedPoint::new(0.52, 0.42));
        assert_eq!(hand.middle_tip(), NormalizedPoint::new(0.3, 0.3));
    }

    #[test]
    fn test_mirrored_flips_x_only() {
        let hand = make_hand((0.25, 0.4), (0.5, 0.5), (0.9, 0.1)).mirrored();
        assert!((hand.index_tip().x - 0.75).abs() < 1e-9);
        assert!((hand.index_tip().y - 0.4).abs() < 1e-9);
        assert!((hand.middle_tip().x - 0.1).abs() < 1e-9);
    }
}
