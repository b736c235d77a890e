use serde::Serialize;

use crate::shared::config::DirectionThresholds;

use super::pupil_localizer::PupilEstimate;

/// Discrete gaze direction from the camera's point of view: a pupil
/// sitting toward the image's left reads as the subject looking right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeDirection {
    Left,
    Right,
    Up,
    Down,
    Center,
}

impl std::fmt::Display for GazeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GazeDirection::Left => "left",
            GazeDirection::Right => "right",
            GazeDirection::Up => "up",
            GazeDirection::Down => "down",
            GazeDirection::Center => "center",
        };
        f.write_str(name)
    }
}

const EDGE_CONFIDENCE: f64 = 0.8;
const CENTER_CONFIDENCE: f64 = 0.7;

/// Maps the two pupil estimates to a direction and a fixed confidence.
#[derive(Clone, Copy, Debug)]
pub struct GazeClassifier {
    thresholds: DirectionThresholds,
}

impl GazeClassifier {
    pub fn new(thresholds: DirectionThresholds) -> Self {
        Self { thresholds }
    }

    /// Horizontal decision first; a vertical decision, when present,
    /// replaces it.
    pub fn classify(&self, left: PupilEstimate, right: PupilEstimate) -> (GazeDirection, f64) {
        let avg_x = (left.x + right.x) / 2.0;
        let avg_y = (left.y + right.y) / 2.0;
        let DirectionThresholds { low, high } = self.thresholds;

        let mut decision = if avg_x < low {
            (GazeDirection::Right, EDGE_CONFIDENCE)
        } else if avg_x > high {
            (GazeDirection::Left, EDGE_CONFIDENCE)
        } else {
            (GazeDirection::Center, CENTER_CONFIDENCE)
        };

        if avg_y < low {
            decision = (GazeDirection::Down, EDGE_CONFIDENCE);
        } else if avg_y > high {
            decision = (GazeDirection::Up, EDGE_CONFIDENCE);
        }
        decision
    }
}

impl Default for GazeClassifier {
    fn default() -> Self {
        Self::new(DirectionThresholds::default())
    }
}
