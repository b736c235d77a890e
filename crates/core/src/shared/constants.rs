pub const CASCADE_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const CASCADE_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

/// Directory name used under the platform cache/config dirs.
pub const APP_DIR_NAME: &str = "Gazewatch";

/// 68-point iBUG layout: eye rings occupy indices 36..42 and 42..48.
pub const LANDMARK_POINT_COUNT: usize = 68;
pub const LEFT_EYE_RING_START: usize = 36;
pub const RIGHT_EYE_RING_START: usize = 42;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
