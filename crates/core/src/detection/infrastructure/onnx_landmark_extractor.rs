/// 68-point facial landmark regressor using ONNX Runtime via `ort`.
///
/// The landmark stage of the precise backend. The face crop is resized to
/// the model's square input and the output is read as `(x, y)` pairs
/// normalized to the crop, in the iBUG 68-point ordering.
use std::path::Path;
use std::sync::Mutex;

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::detection::domain::face_region::FaceRegion;
use crate::detection::domain::landmark_extractor::LandmarkExtractor;
use crate::detection::domain::landmark_set::{EyeRing, LandmarkSet};
use crate::shared::constants::{LANDMARK_POINT_COUNT, LEFT_EYE_RING_START, RIGHT_EYE_RING_START};
use crate::shared::error::GazeError;
use crate::shared::frame::Frame;
use crate::shared::geometry::Point;

/// Used when the model declares a dynamic input size.
const DEFAULT_INPUT_SIZE: u32 = 112;

pub struct OnnxLandmarkExtractor {
    session: Mutex<ort::session::Session>,
    input_size: u32,
}

impl OnnxLandmarkExtractor {
    /// Load a landmark model. The input resolution is read from its NCHW
    /// input shape.
    pub fn new(model_path: &Path) -> Result<Self, GazeError> {
        let session = ort::session::Session::builder()
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| GazeError::model_load(model_path, e))?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::debug!(
            "Loaded landmark model from {} (input {}x{})",
            model_path.display(),
            input_size,
            input_size
        );
        Ok(Self {
            session: Mutex::new(session),
            input_size,
        })
    }

    fn infer(&self, crop: &RgbImage) -> Result<Vec<f32>, GazeError> {
        let input_tensor = preprocess(crop, self.input_size);
        let input_value = ort::value::Tensor::from_array(input_tensor)
            .map_err(|e| GazeError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| GazeError::Inference("landmark session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| GazeError::Inference(e.to_string()))?;
        if outputs.len() == 0 {
            return Err(GazeError::Inference("landmark model produced no outputs".into()));
        }

        let coords = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| GazeError::Inference(e.to_string()))?;
        Ok(coords.iter().copied().collect())
    }
}

impl LandmarkExtractor for OnnxLandmarkExtractor {
    fn extract(&self, frame: &Frame, face: &FaceRegion) -> Result<LandmarkSet, GazeError> {
        let region = face
            .clamp_to(frame.width(), frame.height())
            .ok_or_else(|| GazeError::Inference("face region lies outside the frame".into()))?;
        let crop = frame.rgb_region(
            region.x() as u32,
            region.y() as u32,
            region.width() as u32,
            region.height() as u32,
        );
        let coords = self.infer(&crop)?;
        eye_rings_from_output(&coords, &region)
    }
}

/// Resize the crop to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(crop: &RgbImage, size: u32) -> ndarray::Array4<f32> {
    let resized = imageops::resize(crop, size, size, FilterType::Triangle);
    let s = size as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));
    for (x, y, px) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = px.0[c] as f32 / 255.0;
        }
    }
    tensor
}

/// Map crop-normalized landmark pairs to frame coordinates and pick out
/// the two eye rings.
fn eye_rings_from_output(coords: &[f32], face: &FaceRegion) -> Result<LandmarkSet, GazeError> {
    if coords.len() < LANDMARK_POINT_COUNT * 2 {
        return Err(GazeError::Inference(format!(
            "landmark model returned {} values, expected {}",
            coords.len(),
            LANDMARK_POINT_COUNT * 2
        )));
    }

    let point = |i: usize| {
        Point::new(
            face.x() as f64 + coords[2 * i] as f64 * face.width() as f64,
            face.y() as f64 + coords[2 * i + 1] as f64 * face.height() as f64,
        )
    };
    let ring = |start: usize| {
        EyeRing([
            point(start),
            point(start + 1),
            point(start + 2),
            point(start + 3),
            point(start + 4),
            point(start + 5),
        ])
    };

    Ok(LandmarkSet::new(
        ring(LEFT_EYE_RING_START),
        ring(RIGHT_EYE_RING_START),
    ))
}
