/// Face locator backed by the `rustface` crate (SeetaFace funnel cascade).
///
/// The detector of the heuristic backend. The model is read once and
/// cloned into a short-lived detector per call, so `locate` needs no
/// locking.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::detection::domain::face_locator::FaceLocator;
use crate::detection::domain::face_region::FaceRegion;
use crate::shared::error::GazeError;
use crate::shared::frame::Frame;

/// Cascade score threshold; lower finds more (and falser) faces.
const SCORE_THRESH: f64 = 2.0;

/// Image pyramid downscale step between levels.
const PYRAMID_SCALE: f32 = 0.8;

/// Sliding window step in pixels.
const WINDOW_STEP: u32 = 4;

pub struct CascadeFaceLocator {
    model: rustface::Model,
    min_face_size: u32,
}

impl CascadeFaceLocator {
    pub fn new(model_path: &Path, min_face_size: u32) -> Result<Self, GazeError> {
        let file = File::open(model_path).map_err(|e| GazeError::model_load(model_path, e))?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| GazeError::model_load(model_path, e))?;
        log::debug!("Loaded SeetaFace cascade from {}", model_path.display());
        Ok(Self {
            model,
            min_face_size,
        })
    }
}

impl FaceLocator for CascadeFaceLocator {
    fn locate(&self, frame: &Frame) -> Result<Option<FaceRegion>, GazeError> {
        let gray = frame.to_gray_image();
        let (width, height) = gray.dimensions();

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(SCORE_THRESH);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE);
        detector.set_slide_window_step(WINDOW_STEP, WINDOW_STEP);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
        log::trace!("Cascade reported {} face(s)", faces.len());

        Ok(faces.first().and_then(|face| {
            let bbox = face.bbox();
            FaceRegion::new(bbox.x(), bbox.y(), bbox.width() as i32, bbox.height() as i32)
                .and_then(|r| r.clamp_to(frame.width(), frame.height()))
        }))
    }
}
