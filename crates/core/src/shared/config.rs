use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::GazeError;

/// Horizontal/vertical cut points on the averaged relative pupil position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionThresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for DirectionThresholds {
    fn default() -> Self {
        Self {
            low: 0.4,
            high: 0.6,
        }
    }
}

/// Pipeline configuration, fixed at construction time.
///
/// Every field has a default, so a JSON file only needs the keys it
/// overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// 68-point landmark ONNX model. Absent or unloadable → heuristic backend.
    pub landmark_model_path: Option<PathBuf>,
    /// BlazeFace ONNX model used by the precise backend.
    pub face_model_path: Option<PathBuf>,
    /// SeetaFace cascade model used by the heuristic backend.
    pub cascade_model_path: Option<PathBuf>,
    pub closed_ear_threshold: f64,
    /// Intensity cutoff for the inverted pupil threshold.
    pub pupil_threshold: u8,
    /// Structuring element radius; 1 is a 3×3 square.
    pub morph_kernel_radius: u8,
    pub morph_iterations: u32,
    pub direction_thresholds: DirectionThresholds,
    /// Minimum BlazeFace score.
    pub face_confidence: f64,
    pub cascade_min_face_size: u32,
    /// Intensity cutoff for the heuristic eye-region detector, applied after
    /// histogram equalization.
    pub eye_threshold: u8,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            landmark_model_path: None,
            face_model_path: None,
            cascade_model_path: None,
            closed_ear_threshold: 0.2,
            pupil_threshold: 55,
            morph_kernel_radius: 1,
            morph_iterations: 2,
            direction_thresholds: DirectionThresholds::default(),
            face_confidence: 0.5,
            cascade_min_face_size: 20,
            eye_threshold: 60,
        }
    }
}

impl GazeConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, GazeError> {
        let json = fs::read_to_string(path)?;
        let config: GazeConfig = serde_json::from_str(&json)
            .map_err(|e| GazeError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GazeError> {
        if !self.closed_ear_threshold.is_finite() || self.closed_ear_threshold < 0.0 {
            return Err(GazeError::Config(format!(
                "closed_ear_threshold must be a non-negative number, got {}",
                self.closed_ear_threshold
            )));
        }
        let DirectionThresholds { low, high } = self.direction_thresholds;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(GazeError::Config(format!(
                "direction thresholds must satisfy 0 <= low < high <= 1, got low={low} high={high}"
            )));
        }
        if self.morph_kernel_radius == 0 {
            return Err(GazeError::Config(
                "morph_kernel_radius must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.face_confidence) {
            return Err(GazeError::Config(format!(
                "face_confidence must be between 0.0 and 1.0, got {}",
                self.face_confidence
            )));
        }
        // rustface rejects smaller windows
        if self.cascade_min_face_size < 20 {
            return Err(GazeError::Config(format!(
                "cascade_min_face_size must be at least 20, got {}",
                self.cascade_min_face_size
            )));
        }
        Ok(())
    }
}
