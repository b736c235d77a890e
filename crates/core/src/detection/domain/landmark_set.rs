use serde::{Deserialize, Serialize};

use crate::shared::geometry::Point;

/// Six points outlining one eye, in ring order.
///
/// `p1` and `p4` are the horizontal corners; `(p2, p6)` and `(p3, p5)` are
/// the vertical pairs. The array type pins the count at six for every
/// backend.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EyeRing(pub [Point; 6]);

impl EyeRing {
    /// Ring of six points on a circle, starting at 0° and stepping 60°.
    pub fn circle(center: Point, radius: f64) -> Self {
        EyeRing(std::array::from_fn(|i| center.on_circle(radius, i as f64 * 60.0)))
    }

    pub fn points(&self) -> &[Point; 6] {
        &self.0
    }
}

/// Per-eye landmark rings for one face. "Left" is the eye nearer the left
/// edge of the image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub left: EyeRing,
    pub right: EyeRing,
}

impl LandmarkSet {
    pub const POINTS_PER_EYE: usize = 6;

    pub fn new(left: EyeRing, right: EyeRing) -> Self {
        Self { left, right }
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.left.0.iter().chain(self.right.0.iter())
    }
}
