use chrono::{DateTime, Utc};
use serde::Serialize;

use super::gaze_classifier::GazeDirection;

/// Outcome of analyzing one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeStatus {
    Ok,
    NoFace,
    Closed,
    Error,
}

impl std::fmt::Display for GazeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GazeStatus::Ok => "ok",
            GazeStatus::NoFace => "no_face",
            GazeStatus::Closed => "closed",
            GazeStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Per-frame gaze report.
///
/// `direction` is present only for `ok`. EAR values are 0 when landmarks
/// were never extracted (`no_face`, `error`).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GazeResult {
    status: GazeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<GazeDirection>,
    confidence: f64,
    ear_left: f64,
    ear_right: f64,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl GazeResult {
    pub fn ok(
        direction: GazeDirection,
        confidence: f64,
        ear_left: f64,
        ear_right: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            status: GazeStatus::Ok,
            direction: Some(direction),
            confidence,
            ear_left,
            ear_right,
            timestamp,
            message: None,
        }
    }

    pub fn no_face(timestamp: DateTime<Utc>) -> Self {
        Self::empty(GazeStatus::NoFace, timestamp)
    }

    pub fn closed(ear_left: f64, ear_right: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            ear_left,
            ear_right,
            ..Self::empty(GazeStatus::Closed, timestamp)
        }
    }

    pub fn error(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty(GazeStatus::Error, timestamp)
        }
    }

    fn empty(status: GazeStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            status,
            direction: None,
            confidence: 0.0,
            ear_left: 0.0,
            ear_right: 0.0,
            timestamp,
            message: None,
        }
    }

    pub fn status(&self) -> GazeStatus {
        self.status
    }

    pub fn direction(&self) -> Option<GazeDirection> {
        self.direction
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn ear_left(&self) -> f64 {
        self.ear_left
    }

    pub fn ear_right(&self) -> f64 {
        self.ear_right
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_ok_serializes_direction_without_message() {
        let result = GazeResult::ok(GazeDirection::Right, 0.8, 0.31, 0.29, ts());
        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["direction"], "right");
        assert_eq!(json["confidence"], 0.8);
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_no_face_has_zero_ears_and_no_direction() {
        let result = GazeResult::no_face(ts());
        assert_eq!(result.status(), GazeStatus::NoFace);
        assert_eq!(result.direction(), None);
        assert_eq!(result.ear_left(), 0.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "no_face");
        assert!(json.get("direction").is_none());
    }

    #[test]
    fn test_closed_keeps_ears() {
        let result = GazeResult::closed(0.1, 0.12, ts());
        assert_eq!(result.status(), GazeStatus::Closed);
        assert_eq!(result.ear_right(), 0.12);
        assert_eq!(result.confidence(), 0.0);
    }

    #[test]
    fn test_error_carries_message() {
        let result = GazeResult::error("bad bytes", ts());
        assert_eq!(result.status(), GazeStatus::Error);
        assert_eq!(result.message(), Some("bad bytes"));
        assert_eq!(result.status().to_string(), "error");
    }
}
