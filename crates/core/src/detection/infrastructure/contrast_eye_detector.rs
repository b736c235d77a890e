/// Eye-region detector built from intensity contrast alone.
///
/// Looks for compact dark blobs in the upper half of the face after
/// histogram equalization. Needs no model file, which makes it the eye
/// finder of the heuristic backend.
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{equalize_histogram, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

use crate::detection::domain::eye_region_detector::{EyeCandidate, EyeRegionDetector};

/// Vertical band of the face searched for eyes, as fractions of its height.
const BAND_TOP: f64 = 0.15;
const BAND_BOTTOM: f64 = 0.6;

/// Accepted width/height ratio of an eye blob.
const MIN_ASPECT: f64 = 0.5;
const MAX_ASPECT: f64 = 4.0;

/// At most this many candidates are reported, largest first.
const MAX_CANDIDATES: usize = 2;

pub struct ContrastEyeDetector {
    threshold: u8,
}

impl ContrastEyeDetector {
    /// `threshold` is applied after equalization; darker pixels are
    /// eye candidates.
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }
}

impl EyeRegionDetector for ContrastEyeDetector {
    fn detect(&self, face: &GrayImage) -> Vec<EyeCandidate> {
        let (fw, fh) = face.dimensions();
        let top = (fh as f64 * BAND_TOP) as u32;
        let bottom = (fh as f64 * BAND_BOTTOM) as u32;
        if fw == 0 || bottom <= top {
            return Vec::new();
        }

        let band = image::imageops::crop_imm(face, 0, top, fw, bottom - top).to_image();
        let equalized = equalize_histogram(&band);
        let mask = threshold(&equalized, self.threshold, ThresholdType::BinaryInverted);
        let mask = morphology::open(&mask, Norm::LInf, 1);

        let min_w = (fw / 12).max(2);
        let max_w = fw / 2;

        let mut candidates: Vec<EyeCandidate> = find_contours::<i32>(&mask)
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .filter_map(|c| {
                let (mut x0, mut y0, mut x1, mut y1) = (i32::MAX, i32::MAX, i32::MIN, i32::MIN);
                for p in &c.points {
                    x0 = x0.min(p.x);
                    y0 = y0.min(p.y);
                    x1 = x1.max(p.x);
                    y1 = y1.max(p.y);
                }
                if x0 > x1 {
                    return None;
                }
                Some(EyeCandidate {
                    x: x0 as u32,
                    y: y0 as u32 + top,
                    width: (x1 - x0 + 1) as u32,
                    height: (y1 - y0 + 1) as u32,
                })
            })
            .filter(|c| {
                let aspect = c.width as f64 / c.height as f64;
                c.width >= min_w && c.width <= max_w && (MIN_ASPECT..=MAX_ASPECT).contains(&aspect)
            })
            .collect();

        candidates.sort_by(|a, b| b.area().cmp(&a.area()));
        candidates.truncate(MAX_CANDIDATES);
        log::trace!("Contrast eye detector kept {} candidate(s)", candidates.len());
        candidates
    }
}
