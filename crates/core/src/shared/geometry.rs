use serde::{Deserialize, Serialize};

/// A point in frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn min(&self, other: &Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(&self, other: &Point) -> Point {
        Point::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Point on a circle of `radius` around `self`, `degrees` clockwise
    /// from +x in image coordinates (y grows downward).
    pub fn on_circle(&self, radius: f64, degrees: f64) -> Point {
        let rad = degrees.to_radians();
        Point::new(self.x + radius * rad.cos(), self.y + radius * rad.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_345() {
        assert_relative_eq!(Point::new(0.0, 0.0).distance(&Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_min_max_elementwise() {
        let a = Point::new(1.0, 5.0);
        let b = Point::new(3.0, 2.0);
        assert_eq!(a.min(&b), Point::new(1.0, 2.0));
        assert_eq!(a.max(&b), Point::new(3.0, 5.0));
    }

    #[test]
    fn test_on_circle_quadrants() {
        let c = Point::new(10.0, 10.0);
        let east = c.on_circle(2.0, 0.0);
        let south = c.on_circle(2.0, 90.0);
        assert_relative_eq!(east.x, 12.0, epsilon = 1e-9);
        assert_relative_eq!(east.y, 10.0, epsilon = 1e-9);
        assert_relative_eq!(south.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(south.y, 12.0, epsilon = 1e-9);
    }
}
