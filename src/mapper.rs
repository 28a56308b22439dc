use crate::geometry::{blend, clamp_to_range, NormalizedPoint, ScreenPoint, ScreenSize};

/// Mapper state carried between frames
#[derive(Debug, Clone, Default)]
pub struct MapperState {
    /// Last emitted cursor position; `None` until the first observation
    pub previous: Option<ScreenPoint>,
}

/// Maps a normalized fingertip position to a smoothed, on-screen pixel
pub struct CoordinateMapper {
    screen: ScreenSize,
    sensitivity: f64,
    smoothing: f64,
    state: MapperState,
}

impl CoordinateMapper {
    /// `sensitivity > 0` and `smoothing` in `[0, 1)` are validated by the config layer
    pub fn new(screen: ScreenSize, sensitivity: f64, smoothing: f64) -> Self {
        Self {
            screen,
            sensitivity,
            smoothing,
            state: MapperState::default(),
        }
    }

    pub fn state(&self) -> &MapperState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = MapperState::default();
    }

    pub fn map(&mut self, tip: NormalizedPoint) -> ScreenPoint {
        let max_x = self.screen.width.saturating_sub(1) as f64;
        let max_y = self.screen.height.saturating_sub(1) as f64;

        let raw_x = tip.x * self.screen.width as f64 * self.sensitivity;
        let raw_y = tip.y * self.screen.height as f64 * self.sensitivity;

        let mut x = clamp_to_range(raw_x, 0.0, max_x);
        let mut y = clamp_to_range(raw_y, 0.0, max_y);

        if let Some(prev) = self.state.previous {
            x = blend(prev.x as f64, x, self.smoothing);
            y = blend(prev.y as f64, y, self.smoothing);
        }

        // Both inputs of the blend are in bounds, so the rounded result is too
        let point = ScreenPoint::new(x.round() as i32, y.round() as i32);
        self.state.previous = Some(point);
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: ScreenSize = ScreenSize {
        width: 1920,
        height: 1080,
    };

    fn tip(x: f64, y: f64) -> NormalizedPoint {
        NormalizedPoint::new(x, y)
    }

    #[test]
    fn test_scales_without_clamping() {
        let mut mapper = CoordinateMapper::new(SCREEN, 1.5, 0.0);
        let point = mapper.map(tip(0.5, 0.2));
        assert_eq!(point.x, 1440);
        assert_eq!(point.y, 324);
    }

    #[test]
    fn test_clamps_overshoot() {
        let mut mapper = CoordinateMapper::new(SCREEN, 1.5, 0.0);
        // 0.9 * 1920 * 1.5 = 2592
        let point = mapper.map(tip(0.9, 0.9));
        assert_eq!(point, ScreenPoint::new(1919, 1079));
    }

    #[test]
    fn test_first_frame_is_not_smoothed() {
        let mut mapper = CoordinateMapper::new(SCREEN, 1.0, 0.7);
        assert!(mapper.state().previous.is_none());
        let point = mapper.map(tip(0.5, 0.5));
        assert_eq!(point, ScreenPoint::new(960, 540));
        assert_eq!(mapper.state().previous, Some(point));
    }

    #[test]
    fn test_smoothing_blends_with_previous() {
        let mut mapper = CoordinateMapper::new(SCREEN, 1.0, 0.7);
        mapper.map(tip(0.0, 0.0));
        // 0 * 0.7 + 1000 * 0.3
        let point = mapper.map(tip(1000.0 / 1920.0, 0.0));
        assert_eq!(point.x, 300);
        assert_eq!(point.y, 0);
    }

    #[test]
    fn test_reset_forgets_previous_point() {
        let mut mapper = CoordinateMapper::new(SCREEN, 1.0, 0.7);
        mapper.map(tip(0.0, 0.0));
        mapper.reset();
        assert_eq!(mapper.map(tip(0.5, 0.5)), ScreenPoint::new(960, 540));
    }

    #[test]
    fn test_output_always_in_bounds() {
        let screens = [SCREEN, ScreenSize::new(1, 1), ScreenSize::new(800, 3)];
        let sensitivities = [0.1, 1.0, 1.5, 4.0];
        let smoothings = [0.0, 0.5, 0.95];
        let inputs = [-0.5, 0.0, 0.013, 0.25, 0.5, 0.77, 0.999, 1.0, 1.7];

        for screen in screens {
            for &sensitivity in &sensitivities {
                for &smoothing in &smoothings {
                    let mut mapper = CoordinateMapper::new(screen, sensitivity, smoothing);
                    for &x in &inputs {
                        for &y in inputs.iter().rev() {
                            let p = mapper.map(tip(x, y));
                            assert!(p.x >= 0 && p.x <= screen.width as i32 - 1, "{:?}", p);
                            assert!(p.y >= 0 && p.y <= screen.height as i32 - 1, "{:?}", p);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_smoothing_never_increases_frame_delta() {
        let path = [0.1, 0.8, 0.3, 0.3, 0.9, 0.05, 0.6];

        let max_delta = |smoothing: f64| {
            let mut mapper = CoordinateMapper::new(SCREEN, 1.0, smoothing);
            let mut prev: Option<ScreenPoint> = None;
            let mut deltas = Vec::new();
            for &x in &path {
                let p = mapper.map(tip(x, x));
                if let Some(q) = prev {
                    deltas.push((p.x - q.x).abs());
                }
                prev = Some(p);
            }
            deltas
        };

        let raw = max_delta(0.0);
        for smoothing in [0.3, 0.7, 0.9] {
            let smoothed = max_delta(smoothing);
            let raw_max = raw.iter().max().unwrap();
            let smoothed_max = smoothed.iter().max().unwrap();
            assert!(smoothed_max <= raw_max, "smoothing {} grew delta", smoothing);
            // First jump from an identical starting point is strictly damped
            assert!(smoothed[0] < raw[0]);
        }
    }
}
