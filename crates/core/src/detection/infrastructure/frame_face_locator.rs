/// Last-resort face locator for the heuristic backend when no SeetaFace
/// cascade can be loaded: the whole frame is reported as the face.
use crate::detection::domain::face_locator::FaceLocator;
use crate::detection::domain::face_region::FaceRegion;
use crate::shared::error::GazeError;
use crate::shared::frame::Frame;

pub struct FrameFaceLocator;

impl FaceLocator for FrameFaceLocator {
    fn locate(&self, frame: &Frame) -> Result<Option<FaceRegion>, GazeError> {
        let (Ok(width), Ok(height)) = (i32::try_from(frame.width()), i32::try_from(frame.height()))
        else {
            return Ok(None);
        };
        Ok(FaceRegion::new(0, 0, width, height))
    }
}
