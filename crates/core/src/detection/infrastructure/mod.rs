pub mod backend_factory;
pub mod cascade_face_locator;
pub mod contrast_eye_detector;
pub mod frame_face_locator;
pub mod heuristic_landmark_extractor;
pub mod math;
pub mod onnx_blazeface_locator;
pub mod onnx_landmark_extractor;
