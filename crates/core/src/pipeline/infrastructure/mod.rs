pub mod image_debug_sink;
pub mod threaded_batch_executor;
