use crate::detection::domain::landmark_set::{EyeRing, LandmarkSet};

/// Eye aspect ratio of one ring: vertical openings over horizontal extent.
///
/// `(|p2 - p6| + |p3 - p5|) / (2 |p1 - p4|)`, or 0 when the corners
/// coincide.
pub fn eye_aspect_ratio(ring: &EyeRing) -> f64 {
    let [p1, p2, p3, p4, p5, p6] = ring.points();
    let horizontal = p1.distance(p4);
    if horizontal == 0.0 {
        return 0.0;
    }
    (p2.distance(p6) + p3.distance(p5)) / (2.0 * horizontal)
}

/// Per-eye openness measured by [`BlinkGate::evaluate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlinkReading {
    pub ear_left: f64,
    pub ear_right: f64,
    pub closed: bool,
}

/// Decides whether both eyes are closed.
#[derive(Clone, Copy, Debug)]
pub struct BlinkGate {
    threshold: f64,
}

impl BlinkGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Closed only when both EARs are strictly below the threshold.
    pub fn evaluate(&self, landmarks: &LandmarkSet) -> BlinkReading {
        let ear_left = eye_aspect_ratio(&landmarks.left);
        let ear_right = eye_aspect_ratio(&landmarks.right);
        BlinkReading {
            ear_left,
            ear_right,
            closed: ear_left < self.threshold && ear_right < self.threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geometry::Point;
    use approx::assert_relative_eq;
    use rstest::rstest;

    /// Ring 20 px wide whose vertical pairs are `opening` apart.
    fn ring_with_opening(opening: f64) -> EyeRing {
        let h = opening / 2.0;
        EyeRing([
            Point::new(0.0, 0.0),
            Point::new(7.0, -h),
            Point::new(13.0, -h),
            Point::new(20.0, 0.0),
            Point::new(13.0, h),
            Point::new(7.0, h),
        ])
    }

    #[test]
    fn test_ear_of_known_ring() {
        // (6 + 6) / (2 * 20)
        assert_relative_eq!(eye_aspect_ratio(&ring_with_opening(6.0)), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_ear_of_collapsed_corners_is_zero() {
        let p = Point::new(5.0, 5.0);
        let ring = EyeRing([p, Point::new(5.0, 0.0), p, p, p, Point::new(5.0, 10.0)]);
        assert_eq!(eye_aspect_ratio(&ring), 0.0);
    }

    #[test]
    fn test_circle_ring_ear() {
        // sin(60°) * 2r * 2 / (2 * 2r)
        let ring = EyeRing::circle(Point::new(10.0, 10.0), 4.0);
        assert_relative_eq!(eye_aspect_ratio(&ring), 3f64.sqrt() / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ear_decreases_monotonically_as_eye_closes() {
        let ears: Vec<f64> = (0..=12)
            .rev()
            .map(|o| eye_aspect_ratio(&ring_with_opening(o as f64)))
            .collect();
        assert!(ears.windows(2).all(|w| w[1] < w[0]));
    }

    #[rstest]
    #[case(3.0, 3.0, true)]
    #[case(3.0, 8.0, false)]
    #[case(8.0, 3.0, false)]
    #[case(8.0, 8.0, false)]
    fn test_closed_needs_both_eyes(#[case] left: f64, #[case] right: f64, #[case] closed: bool) {
        let gate = BlinkGate::new(0.2);
        let reading = gate.evaluate(&LandmarkSet::new(
            ring_with_opening(left),
            ring_with_opening(right),
        ));
        assert_eq!(reading.closed, closed);
    }

    #[test]
    fn test_closed_flips_exactly_at_threshold() {
        let gate = BlinkGate::new(0.2);
        // opening 4 → EAR exactly 0.2, not closed
        let at = gate.evaluate(&LandmarkSet::new(ring_with_opening(4.0), ring_with_opening(4.0)));
        assert!(!at.closed);
        let below = gate.evaluate(&LandmarkSet::new(
            ring_with_opening(3.99),
            ring_with_opening(3.99),
        ));
        assert!(below.closed);
    }
}
