pub mod blink_gate;
pub mod eye_region;
pub mod gaze_classifier;
pub mod gaze_result;
pub mod pupil_localizer;
