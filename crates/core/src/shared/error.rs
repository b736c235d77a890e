use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the gaze pipeline and its adapters.
///
/// Per-frame failures are folded into a `GazeResult` with `error` status;
/// only initialization returns these to the caller directly.
#[derive(Error, Debug)]
pub enum GazeError {
    #[error("failed to decode frame: {0}")]
    Decode(String),
    #[error("failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("batch run aborted: {0}")]
    Batch(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GazeError {
    pub(crate) fn model_load(path: &std::path::Path, reason: impl ToString) -> Self {
        GazeError::ModelLoad {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
