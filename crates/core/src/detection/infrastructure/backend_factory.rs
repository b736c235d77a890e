use std::path::PathBuf;

use crate::detection::domain::face_locator::FaceLocator;
use crate::detection::domain::landmark_extractor::{BackendKind, LandmarkExtractor};
use crate::shared::config::GazeConfig;
use crate::shared::constants::{CASCADE_MODEL_NAME, CASCADE_MODEL_URL};
use crate::shared::error::GazeError;
use crate::shared::model_resolver;

use super::cascade_face_locator::CascadeFaceLocator;
use super::contrast_eye_detector::ContrastEyeDetector;
use super::frame_face_locator::FrameFaceLocator;
use super::heuristic_landmark_extractor::HeuristicLandmarkExtractor;
use super::onnx_blazeface_locator::OnnxBlazefaceLocator;
use super::onnx_landmark_extractor::OnnxLandmarkExtractor;

/// The face and landmark stages chosen for one pipeline.
pub struct Backend {
    pub kind: BackendKind,
    pub face_locator: Box<dyn FaceLocator>,
    pub landmarks: Box<dyn LandmarkExtractor>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").field("kind", &self.kind).finish()
    }
}

/// Creates the best available backend, preferring the precise models.
///
/// The precise backend needs both the landmark model and the BlazeFace
/// model. If either is missing or fails to load, logs one warning and
/// builds the heuristic backend instead. The heuristic face locator uses
/// `cascade_model_path`, or the cached/downloaded SeetaFace model when no
/// path is configured; without any cascade it treats each frame as one
/// face. Only an invalid configuration is an error.
pub fn create_backend(config: &GazeConfig) -> Result<Backend, GazeError> {
    create_backend_with(config, fetch_cascade)
}

fn create_backend_with(
    config: &GazeConfig,
    fetch_cascade: impl FnOnce() -> Option<PathBuf>,
) -> Result<Backend, GazeError> {
    config.validate()?;

    match &config.landmark_model_path {
        Some(landmark_path) => match try_precise(config) {
            Ok(backend) => {
                log::info!(
                    "Using precise landmark backend ({})",
                    landmark_path.display()
                );
                return Ok(backend);
            }
            Err(e) => {
                log::warn!("Precise landmark backend unavailable, falling back to heuristic: {e}");
            }
        },
        None => log::info!("No landmark model configured"),
    }

    let backend = heuristic(config, fetch_cascade);
    log::info!("Using heuristic landmark backend");
    Ok(backend)
}

fn try_precise(config: &GazeConfig) -> Result<Backend, GazeError> {
    let (Some(landmark_path), Some(face_path)) =
        (&config.landmark_model_path, &config.face_model_path)
    else {
        return Err(GazeError::Config(
            "precise backend requires face_model_path".into(),
        ));
    };
    let landmarks = OnnxLandmarkExtractor::new(landmark_path)?;
    let face_locator = OnnxBlazefaceLocator::new(face_path, config.face_confidence)?;
    Ok(Backend {
        kind: BackendKind::Precise,
        face_locator: Box::new(face_locator),
        landmarks: Box::new(landmarks),
    })
}

fn heuristic(config: &GazeConfig, fetch_cascade: impl FnOnce() -> Option<PathBuf>) -> Backend {
    let eyes = ContrastEyeDetector::new(config.eye_threshold);
    Backend {
        kind: BackendKind::Heuristic,
        face_locator: cascade_or_frame(config, fetch_cascade),
        landmarks: Box::new(HeuristicLandmarkExtractor::new(Box::new(eyes))),
    }
}

fn cascade_or_frame(
    config: &GazeConfig,
    fetch_cascade: impl FnOnce() -> Option<PathBuf>,
) -> Box<dyn FaceLocator> {
    let Some(path) = config.cascade_model_path.clone().or_else(fetch_cascade) else {
        log::warn!("No face cascade available, treating each frame as one face");
        return Box::new(FrameFaceLocator);
    };
    match CascadeFaceLocator::new(&path, config.cascade_min_face_size) {
        Ok(locator) => Box::new(locator),
        Err(e) => {
            log::warn!("{e}; treating each frame as one face");
            Box::new(FrameFaceLocator)
        }
    }
}

fn fetch_cascade() -> Option<PathBuf> {
    match model_resolver::resolve(CASCADE_MODEL_NAME, CASCADE_MODEL_URL, None, None) {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("Could not obtain {CASCADE_MODEL_NAME}: {e}");
            None
        }
    }
}
