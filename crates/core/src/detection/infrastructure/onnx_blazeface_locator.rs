/// BlazeFace face locator using ONNX Runtime via `ort`.
///
/// The general-purpose detector of the precise backend. Decodes the
/// short-range anchor grid, applies NMS, and reports the highest-scoring
/// face.
use std::path::Path;
use std::sync::Mutex;

use crate::detection::domain::face_locator::FaceLocator;
use crate::detection::domain::face_region::FaceRegion;
use crate::shared::error::GazeError;
use crate::shared::frame::Frame;

use super::math::{nms, ScoredBox};

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

/// Values per anchor in the regressor output (box + 6 keypoints).
const REGRESSOR_STRIDE: usize = 16;

/// BlazeFace locator backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so the session sits behind a
/// mutex; the weights themselves are never modified.
pub struct OnnxBlazefaceLocator {
    session: Mutex<ort::session::Session>,
    confidence: f64,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceLocator {
    /// Load a BlazeFace ONNX model.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, GazeError> {
        let session = load_session(model_path).map_err(|e| GazeError::model_load(model_path, e))?;
        log::debug!("Loaded BlazeFace model from {}", model_path.display());
        Ok(Self {
            session: Mutex::new(session),
            confidence,
            anchors: generate_anchors(),
        })
    }

    /// Runs the model and returns copies of (regressors, raw scores).
    fn infer(&self, frame: &Frame) -> Result<(Vec<f32>, Vec<f32>), GazeError> {
        let input_tensor = preprocess(frame, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)
            .map_err(|e| GazeError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| GazeError::Inference("BlazeFace session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| GazeError::Inference(e.to_string()))?;

        // regressors: [1, 896, 16], classificators: [1, 896, 1]
        if outputs.len() < 2 {
            return Err(GazeError::Inference(format!(
                "BlazeFace model expected 2 outputs, got {}",
                outputs.len()
            )));
        }

        let regressors = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| GazeError::Inference(e.to_string()))?;
        let scores = outputs[1]
            .try_extract_array::<f32>()
            .map_err(|e| GazeError::Inference(e.to_string()))?;

        Ok((
            regressors.iter().copied().collect(),
            scores.iter().copied().collect(),
        ))
    }
}

fn load_session(model_path: &Path) -> ort::Result<ort::session::Session> {
    ort::session::Session::builder()?.commit_from_file(model_path)
}

impl FaceLocator for OnnxBlazefaceLocator {
    fn locate(&self, frame: &Frame) -> Result<Option<FaceRegion>, GazeError> {
        if frame.is_empty() {
            return Ok(None);
        }
        let (reg_data, score_data) = self.infer(frame)?;
        let mut raw_dets = decode_detections(
            &reg_data,
            &score_data,
            &self.anchors,
            self.confidence,
            frame.width(),
            frame.height(),
        );

        let filtered = nms(&mut raw_dets, NMS_IOU_THRESH);
        Ok(filtered.iter().find_map(|d| {
            FaceRegion::new(
                d.x1 as i32,
                d.y1 as i32,
                (d.x2 - d.x1) as i32,
                (d.y2 - d.y1) as i32,
            )
        }))
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode anchor-relative boxes above `confidence` into frame coordinates.
fn decode_detections(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    confidence: f64,
    fw: u32,
    fh: u32,
) -> Vec<ScoredBox> {
    let mut raw_dets = Vec::new();
    let num_anchors = anchors.len().min(NUM_ANCHORS);

    for (i, &raw_score) in score_data.iter().enumerate().take(num_anchors) {
        let score = sigmoid(raw_score);
        if (score as f64) < confidence {
            continue;
        }

        let anchor = &anchors[i];
        let reg_offset = i * REGRESSOR_STRIDE;
        if reg_offset + 4 > reg_data.len() {
            break;
        }

        let cx = anchor[0] + reg_data[reg_offset] / INPUT_SIZE as f32;
        let cy = anchor[1] + reg_data[reg_offset + 1] / INPUT_SIZE as f32;
        let w = reg_data[reg_offset + 2] / INPUT_SIZE as f32;
        let h = reg_data[reg_offset + 3] / INPUT_SIZE as f32;

        let x1 = ((cx - w / 2.0) * fw as f32).max(0.0);
        let y1 = ((cy - h / 2.0) * fh as f32).max(0.0);
        let x2 = ((cx + w / 2.0) * fw as f32).min(fw as f32);
        let y2 = ((cy + h / 2.0) * fh as f32).min(fh as f32);

        raw_dets.push(ScoredBox {
            x1: x1 as f64,
            y1: y1 as f64,
            x2: x2 as f64,
            y2: y2 as f64,
            score: score as f64,
        });
    }

    raw_dets
}

/// Resize frame to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));
    if src_h == 0 || src_w == 0 {
        return tensor;
    }

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    tensor
}

/// Short-range anchors: a 16×16 grid with 2 anchors per cell and an 8×8
/// grid with 6.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }

    anchors
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
