use crate::detection::domain::landmark_set::EyeRing;
use crate::shared::geometry::Point;

/// Bounding box of an eye ring in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl EyeBox {
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Eye polygon plus its bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeRegion {
    pub polygon: [Point; 6],
    pub bbox: EyeBox,
}

impl EyeRegion {
    pub fn from_ring(ring: &EyeRing) -> Self {
        let points = ring.points();
        let (lo, hi) = points[1..]
            .iter()
            .fold((points[0], points[0]), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Self {
            polygon: *points,
            bbox: EyeBox {
                x: lo.x,
                y: lo.y,
                width: hi.x - lo.x,
                height: hi.y - lo.y,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_spans_ring() {
        let ring = EyeRing::circle(Point::new(50.0, 30.0), 10.0);
        let region = EyeRegion::from_ring(&ring);
        assert_relative_eq!(region.bbox.x, 40.0, epsilon = 1e-9);
        assert_relative_eq!(region.bbox.width, 20.0, epsilon = 1e-9);
        assert_relative_eq!(region.bbox.height, 2.0 * 10.0 * 60f64.to_radians().sin(), epsilon = 1e-9);
        assert_eq!(region.polygon, *ring.points());
    }

    #[test]
    fn test_collapsed_ring_is_degenerate() {
        let p = Point::new(3.0, 4.0);
        let region = EyeRegion::from_ring(&EyeRing([p; 6]));
        assert!(region.bbox.is_degenerate());
        assert_eq!(region.bbox.width, 0.0);
    }
}
