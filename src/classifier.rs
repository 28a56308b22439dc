use crate::geometry::{distance, NormalizedPoint};

/// Pinch state for a single frame. Both flags may be set at once;
/// the debouncer decides which one (if any) is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickFlags {
    pub left: bool,
    pub right: bool,
}

impl ClickFlags {
    pub fn any(&self) -> bool {
        self.left || self.right
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GestureClassifier {
    left_threshold: f64,
    right_threshold: f64,
}

impl GestureClassifier {
    pub fn new(left_threshold: f64, right_threshold: f64) -> Self {
        Self {
            left_threshold,
            right_threshold,
        }
    }

    /// Thumb-to-index pinch is a left click, thumb-to-middle pinch a right click
    pub fn classify(
        &self,
        index_tip: NormalizedPoint,
        thumb_tip: NormalizedPoint,
        middle_tip: NormalizedPoint,
    ) -> ClickFlags {
        let d_left = distance(thumb_tip, index_tip);
        let d_right = distance(thumb_tip, middle_tip);
        ClickFlags {
            left: d_left < self.left_threshold,
            right: d_right < self.right_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> NormalizedPoint {
        NormalizedPoint::new(x, y)
    }

    #[test]
    fn test_left_pinch() {
        let classifier = GestureClassifier::new(0.05, 0.05);
        // d_left = 0.03, d_right = 0.06
        let flags = classifier.classify(p(0.53, 0.5), p(0.5, 0.5), p(0.5, 0.56));
        assert_eq!(
            flags,
            ClickFlags {
                left: true,
                right: false
            }
        );
    }

    #[test]
    fn test_right_pinch() {
        let classifier = GestureClassifier::new(0.05, 0.05);
        let flags = classifier.classify(p(0.3, 0.3), p(0.5, 0.5), p(0.52, 0.5));
        assert!(!flags.left);
        assert!(flags.right);
    }

    #[test]
    fn test_open_hand_is_no_click() {
        let classifier = GestureClassifier::new(0.05, 0.05);
        let flags = classifier.classify(p(0.3, 0.3), p(0.5, 0.5), p(0.7, 0.3));
        assert!(!flags.any());
    }

    #[test]
    fn test_threshold_is_strict() {
        let classifier = GestureClassifier::new(0.25, 0.25);
        // Exactly on the threshold is not a pinch
        let flags = classifier.classify(p(0.25, 0.0), p(0.0, 0.0), p(0.0, 0.5));
        assert!(!flags.left);
    }

    #[test]
    fn test_both_flags_can_be_set() {
        let classifier = GestureClassifier::new(0.05, 0.05);
        let flags = classifier.classify(p(0.51, 0.5), p(0.5, 0.5), p(0.5, 0.51));
        assert!(flags.left && flags.right);
    }

    #[test]
    fn test_independent_thresholds() {
        let classifier = GestureClassifier::new(0.02, 0.1);
        // Both fingers 0.04 from the thumb
        let flags = classifier.classify(p(0.54, 0.5), p(0.5, 0.5), p(0.5, 0.54));
        assert!(!flags.left);
        assert!(flags.right);
    }
}
