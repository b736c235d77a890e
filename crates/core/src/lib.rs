//! Single-frame gaze estimation.
//!
//! Frame → face → eye landmarks → blink gate → pupil localization →
//! direction. See [`pipeline::gaze_pipeline::GazePipeline`] for the entry
//! point and [`detection::infrastructure::backend_factory`] for backend
//! selection.

pub mod detection;
pub mod gaze;
pub mod pipeline;
pub mod shared;
