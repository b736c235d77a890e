use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::gaze::domain::gaze_result::GazeResult;
use crate::pipeline::batch_executor::{BatchConfig, BatchExecutor, BatchItem};
use crate::pipeline::gaze_pipeline::GazePipeline;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::error::GazeError;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

type Job = (usize, PathBuf);

struct Done {
    index: usize,
    result: GazeResult,
    read_ms: f64,
    analyze_ms: f64,
}

/// Analyzes image files on a pool of worker threads.
///
/// Layout: `feeder → N × [read, analyze] → main [collect]`
///
/// All workers share one pipeline. Results are put back in input order
/// before returning.
pub struct ThreadedBatchExecutor {
    channel_capacity: usize,
}

impl ThreadedBatchExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Default for ThreadedBatchExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchExecutor for ThreadedBatchExecutor {
    fn execute(
        &self,
        pipeline: Arc<GazePipeline>,
        inputs: &[PathBuf],
        config: BatchConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<BatchItem>, GazeError> {
        let total = inputs.len();
        let workers = config.workers.clamp(1, total.max(1));
        logger.info(&format!(
            "Analyzing {total} image(s) on {workers} worker(s), {} backend",
            pipeline.backend()
        ));

        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(self.channel_capacity);
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<Done>();

        let feeder = spawn_feeder(inputs.to_vec(), job_tx, config.cancelled.clone());
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                spawn_worker(
                    pipeline.clone(),
                    job_rx.clone(),
                    done_tx.clone(),
                    config.timestamp,
                    config.cancelled.clone(),
                )
            })
            .collect();
        drop(job_rx);
        drop(done_tx);

        let collected = collect_results(done_rx, total, &config, logger);
        join_threads(feeder, handles, &config.cancelled)?;
        let slots = collected?;

        inputs
            .iter()
            .zip(slots)
            .map(|(input, slot)| {
                slot.map(|result| BatchItem {
                    input: input.clone(),
                    result,
                })
                .ok_or_else(|| GazeError::Batch(format!("no result for {}", input.display())))
            })
            .collect()
    }
}

fn spawn_feeder(
    inputs: Vec<PathBuf>,
    job_tx: crossbeam_channel::Sender<Job>,
    cancelled: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for job in inputs.into_iter().enumerate() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            if job_tx.send(job).is_err() {
                break;
            }
        }
    })
}

fn spawn_worker(
    pipeline: Arc<GazePipeline>,
    job_rx: crossbeam_channel::Receiver<Job>,
    done_tx: crossbeam_channel::Sender<Done>,
    timestamp: Option<DateTime<Utc>>,
    cancelled: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for (index, path) in job_rx {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let done = analyze_file(&pipeline, index, &path, timestamp);
            if done_tx.send(done).is_err() {
                break;
            }
        }
    })
}

fn analyze_file(
    pipeline: &GazePipeline,
    index: usize,
    path: &Path,
    timestamp: Option<DateTime<Utc>>,
) -> Done {
    let started = Instant::now();
    let bytes = std::fs::read(path);
    let read_ms = started.elapsed().as_secs_f64() * 1000.0;
    let stamp = timestamp.unwrap_or_else(Utc::now);

    let started = Instant::now();
    let result = match bytes {
        Ok(bytes) => pipeline.analyze_bytes(&bytes, index, stamp),
        Err(e) => {
            log::warn!("Cannot read {}: {e}", path.display());
            GazeResult::error(format!("{}: {e}", path.display()), stamp)
        }
    };

    Done {
        index,
        result,
        read_ms,
        analyze_ms: started.elapsed().as_secs_f64() * 1000.0,
    }
}

/// Receives finished images until every worker hangs up, reporting
/// progress as they arrive.
fn collect_results(
    done_rx: crossbeam_channel::Receiver<Done>,
    total: usize,
    config: &BatchConfig,
    logger: &mut dyn PipelineLogger,
) -> Result<Vec<Option<GazeResult>>, GazeError> {
    let mut slots: Vec<Option<GazeResult>> = vec![None; total];
    let mut finished = 0;

    for done in done_rx {
        logger.timing("read", done.read_ms);
        logger.timing("analyze", done.analyze_ms);
        logger.outcome(done.result.status());
        slots[done.index] = Some(done.result);
        finished += 1;
        logger.progress(finished, total);

        if let Some(ref callback) = config.on_progress {
            if !callback(finished, total) {
                config.cancelled.store(true, Ordering::Relaxed);
                return Err(GazeError::Batch("cancelled".into()));
            }
        }
    }

    if config.cancelled.load(Ordering::Relaxed) {
        return Err(GazeError::Batch("cancelled".into()));
    }
    Ok(slots)
}

fn join_threads(
    feeder: std::thread::JoinHandle<()>,
    workers: Vec<std::thread::JoinHandle<()>>,
    cancelled: &AtomicBool,
) -> Result<(), GazeError> {
    let mut panicked = feeder.join().is_err();
    for handle in workers {
        panicked |= handle.join().is_err();
    }
    if panicked {
        cancelled.store(true, Ordering::Relaxed);
        return Err(GazeError::Batch("worker thread panicked".into()));
    }
    Ok(())
}
