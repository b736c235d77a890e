pub mod eye_region_detector;
pub mod face_locator;
pub mod face_region;
pub mod landmark_extractor;
pub mod landmark_set;
