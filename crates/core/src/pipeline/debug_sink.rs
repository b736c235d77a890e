use crate::detection::domain::face_region::FaceRegion;
use crate::detection::domain::landmark_set::LandmarkSet;
use crate::gaze::domain::gaze_classifier::GazeDirection;
use crate::gaze::domain::gaze_result::GazeStatus;
use crate::shared::error::GazeError;
use crate::shared::frame::Frame;
use crate::shared::geometry::Point;

/// Everything the pipeline learned about one frame, for visualization.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugAnnotations {
    pub face: FaceRegion,
    pub landmarks: Option<LandmarkSet>,
    /// Left and right pupil centres in frame coordinates.
    pub pupils: Option<[Point; 2]>,
    pub status: GazeStatus,
    pub direction: Option<GazeDirection>,
}

impl DebugAnnotations {
    pub fn new(face: FaceRegion) -> Self {
        Self {
            face,
            landmarks: None,
            pupils: None,
            status: GazeStatus::Error,
            direction: None,
        }
    }
}

/// Side channel receiving annotated frames.
///
/// Failures are reported to the caller for logging; they never change the
/// frame's result.
pub trait DebugSink: Send + Sync {
    fn emit(&self, frame: &Frame, annotations: &DebugAnnotations) -> Result<(), GazeError>;
}
