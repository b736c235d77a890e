use crate::shared::error::GazeError;
use crate::shared::frame::Frame;

use super::face_region::FaceRegion;

/// Domain interface for finding the primary face in a frame.
///
/// Returns the first detection the backend reports and discards the rest;
/// `Ok(None)` means no face, which is not an error.
pub trait FaceLocator: Send + Sync {
    fn locate(&self, frame: &Frame) -> Result<Option<FaceRegion>, GazeError>;
}
