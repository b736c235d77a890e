pub mod batch_executor;
pub mod debug_sink;
pub mod gaze_pipeline;
pub mod infrastructure;
pub mod pipeline_logger;
