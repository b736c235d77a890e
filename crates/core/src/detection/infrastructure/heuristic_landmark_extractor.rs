/// Landmark backend that synthesizes eye rings from coarse eye boxes.
///
/// Each detected eye gets six points on a circle around its centre. When
/// fewer than two eyes are found, rings are placed at canonical positions
/// inside the face box, so this backend always answers.
use crate::detection::domain::eye_region_detector::{EyeCandidate, EyeRegionDetector};
use crate::detection::domain::face_region::FaceRegion;
use crate::detection::domain::landmark_extractor::LandmarkExtractor;
use crate::detection::domain::landmark_set::{EyeRing, LandmarkSet};
use crate::shared::error::GazeError;
use crate::shared::frame::Frame;
use crate::shared::geometry::Point;

pub struct HeuristicLandmarkExtractor {
    eyes: Box<dyn EyeRegionDetector>,
}

impl HeuristicLandmarkExtractor {
    pub fn new(eyes: Box<dyn EyeRegionDetector>) -> Self {
        Self { eyes }
    }
}

impl LandmarkExtractor for HeuristicLandmarkExtractor {
    fn extract(&self, frame: &Frame, face: &FaceRegion) -> Result<LandmarkSet, GazeError> {
        let Some(region) = face.clamp_to(frame.width(), frame.height()) else {
            return Ok(canonical_rings(face));
        };
        let gray = frame.gray_region(
            region.x() as u32,
            region.y() as u32,
            region.width() as u32,
            region.height() as u32,
        );

        let mut found = self.eyes.detect(&gray);
        if found.len() < 2 {
            log::debug!(
                "Eye detector found {} region(s), using canonical placement",
                found.len()
            );
            return Ok(canonical_rings(&region));
        }

        found.sort_by_key(|c| c.x);
        let ring = |c: &EyeCandidate| {
            let center = Point::new(
                region.x() as f64 + c.x as f64 + c.width as f64 / 2.0,
                region.y() as f64 + c.y as f64 + c.height as f64 / 2.0,
            );
            EyeRing::circle(center, c.width.min(c.height) as f64 / 3.0)
        };
        Ok(LandmarkSet::new(ring(&found[0]), ring(&found[1])))
    }
}

/// Eyes at one third of the face height, one third in from each side.
fn canonical_rings(face: &FaceRegion) -> LandmarkSet {
    let (x, y) = (face.x() as f64, face.y() as f64);
    let (w, h) = (face.width() as f64, face.height() as f64);
    let radius = w / 12.0;
    LandmarkSet::new(
        EyeRing::circle(Point::new(x + w / 3.0, y + h / 3.0), radius),
        EyeRing::circle(Point::new(x + 2.0 * w / 3.0, y + h / 3.0), radius),
    )
}
