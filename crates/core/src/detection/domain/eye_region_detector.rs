use image::GrayImage;

/// An eye-like rectangle in face sub-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EyeCandidate {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl EyeCandidate {
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// Domain interface for finding eye regions inside a face crop.
///
/// Used by the heuristic landmark backend; an empty result is normal.
pub trait EyeRegionDetector: Send + Sync {
    fn detect(&self, face: &GrayImage) -> Vec<EyeCandidate>;
}
