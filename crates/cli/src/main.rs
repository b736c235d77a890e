use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use gazewatch_core::gaze::domain::gaze_result::GazeResult;
use gazewatch_core::pipeline::batch_executor::{BatchConfig, BatchExecutor};
use gazewatch_core::pipeline::gaze_pipeline::GazePipeline;
use gazewatch_core::pipeline::infrastructure::image_debug_sink::ImageDebugSink;
use gazewatch_core::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
use gazewatch_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use gazewatch_core::shared::config::GazeConfig;
use gazewatch_core::shared::constants::{CASCADE_MODEL_NAME, CASCADE_MODEL_URL, IMAGE_EXTENSIONS};
use gazewatch_core::shared::model_resolver;

/// Estimate where a face in each image is looking.
#[derive(Parser, Debug)]
#[command(name = "gazewatch")]
struct Cli {
    /// Image files or directories of images.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// 68-point landmark ONNX model (enables the precise backend).
    #[arg(long)]
    landmark_model: Option<PathBuf>,

    /// BlazeFace ONNX model used with --landmark-model.
    #[arg(long)]
    face_model: Option<PathBuf>,

    /// SeetaFace cascade model. Downloaded to the cache when omitted.
    #[arg(long)]
    cascade_model: Option<PathBuf>,

    /// Pupil intensity threshold (0-255).
    #[arg(long)]
    pupil_threshold: Option<u8>,

    /// Eye aspect ratio below which an eye counts as closed.
    #[arg(long)]
    closed_ear_threshold: Option<f64>,

    /// Write annotated gaze_<n>.png frames to this directory.
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Worker threads.
    #[arg(long, default_value = "1")]
    workers: usize,

    /// Pretty-print each JSON result.
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct OutputLine<'a> {
    input: String,
    result: &'a GazeResult,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut config = load_config(&cli)?;
    if config.cascade_model_path.is_none() {
        config.cascade_model_path = resolve_cascade_model();
    }

    let mut pipeline = GazePipeline::from_config(&config)?;
    if let Some(dir) = &cli.debug_dir {
        pipeline = pipeline.with_debug_sink(Box::new(ImageDebugSink::new(dir)));
    }
    log::info!("Gaze backend: {}", pipeline.backend());

    let inputs = expand_inputs(&cli.inputs)?;
    if inputs.is_empty() {
        return Err("No images found in the given inputs".into());
    }

    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(|current, total| {
        eprint!("\rAnalyzing image {current}/{total}");
        true
    });
    let batch = BatchConfig {
        workers: cli.workers,
        on_progress: Some(progress),
        ..Default::default()
    };

    let mut logger = StdoutPipelineLogger::default();
    let items =
        ThreadedBatchExecutor::new().execute(Arc::new(pipeline), &inputs, batch, &mut logger)?;
    eprintln!();

    for item in &items {
        let line = OutputLine {
            input: item.input.display().to_string(),
            result: &item.result,
        };
        let json = if cli.pretty {
            serde_json::to_string_pretty(&line)?
        } else {
            serde_json::to_string(&line)?
        };
        println!("{json}");
    }

    logger.summary();
    Ok(())
}

/// Defaults, then the JSON file, then explicit flags.
fn load_config(cli: &Cli) -> Result<GazeConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => GazeConfig::from_json_file(path)?,
        None => GazeConfig::default(),
    };

    if let Some(path) = &cli.landmark_model {
        config.landmark_model_path = Some(path.clone());
    }
    if let Some(path) = &cli.face_model {
        config.face_model_path = Some(path.clone());
    }
    if let Some(path) = &cli.cascade_model {
        config.cascade_model_path = Some(path.clone());
    }
    if let Some(t) = cli.pupil_threshold {
        config.pupil_threshold = t;
    }
    if let Some(t) = cli.closed_ear_threshold {
        config.closed_ear_threshold = t;
    }

    config.validate()?;
    Ok(config)
}

/// Resolved here for the progress display. A failure is not fatal: the
/// backend factory degrades without a cascade.
fn resolve_cascade_model() -> Option<PathBuf> {
    log::info!("Resolving model: {CASCADE_MODEL_NAME}");
    match model_resolver::resolve(
        CASCADE_MODEL_NAME,
        CASCADE_MODEL_URL,
        None,
        Some(Box::new(download_progress)),
    ) {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("Could not obtain {CASCADE_MODEL_NAME}: {e}");
            None
        }
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    for input in &cli.inputs {
        if !input.exists() {
            return Err(format!("Input not found: {}", input.display()).into());
        }
    }
    if cli.workers == 0 {
        return Err("Workers must be at least 1".into());
    }
    if cli.face_model.is_some() && cli.landmark_model.is_none() {
        log::warn!("--face-model has no effect without --landmark-model");
    }
    Ok(())
}

/// Files are taken as given; directories contribute their image files in
/// name order.
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut expanded = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut images: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_image(path))
                .collect();
            images.sort();
            expanded.extend(images);
        } else {
            expanded.push(input.clone());
        }
    }
    Ok(expanded)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face cascade model... {pct}%");
    } else {
        eprint!("\rDownloading face cascade model... {downloaded} bytes");
    }
}
