use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::gaze::domain::gaze_result::GazeResult;
use crate::shared::error::GazeError;

use super::gaze_pipeline::GazePipeline;
use super::pipeline_logger::PipelineLogger;

/// One analyzed input, in the order it was submitted.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchItem {
    pub input: PathBuf,
    pub result: GazeResult,
}

/// Configuration for a batch run.
pub struct BatchConfig {
    pub workers: usize,
    /// Stamp every result with this instant instead of the analysis time.
    pub timestamp: Option<DateTime<Utc>>,
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            timestamp: None,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Abstracts how a list of image files is fed through one shared pipeline.
pub trait BatchExecutor: Send {
    fn execute(
        &self,
        pipeline: Arc<GazePipeline>,
        inputs: &[PathBuf],
        config: BatchConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<BatchItem>, GazeError>;
}
