use crate::shared::error::GazeError;
use crate::shared::frame::Frame;

use super::face_region::FaceRegion;
use super::landmark_set::LandmarkSet;

/// Which landmark strategy a pipeline was built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Pretrained landmark model.
    Precise,
    /// Eye-region detection plus synthetic ring placement.
    Heuristic,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Precise => write!(f, "precise"),
            BackendKind::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Domain interface for eye landmark extraction within a located face.
///
/// Implementations always return six points per eye; callers never branch
/// on the backend.
pub trait LandmarkExtractor: Send + Sync {
    fn extract(&self, frame: &Frame, face: &FaceRegion) -> Result<LandmarkSet, GazeError>;
}
