//! Small geometry helpers shared by the mapper and the classifier

use serde::{Deserialize, Serialize};

/// A point in normalized image coordinates (0.0 to 1.0 on both axes)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Integer pixel coordinate on the target screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Target screen dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Euclidean distance between two normalized points
pub fn distance(a: NormalizedPoint, b: NormalizedPoint) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Bound `v` to `[lo, hi]`
pub fn clamp_to_range(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

/// Linear blend: `previous * smoothing + current * (1 - smoothing)`
pub fn blend(previous: f64, current: f64, smoothing: f64) -> f64 {
    previous * smoothing + current * (1.0 - smoothing)
}
