use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::gaze::domain::gaze_result::GazeStatus;

/// Cross-cutting logger for batch orchestration events.
///
/// Keeps the executor independent of where progress ends up (stderr via
/// `log`, a test, nothing at all).
pub trait PipelineLogger: Send {
    /// Report image-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one image.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record the outcome of one image.
    fn outcome(&mut self, status: GazeStatus);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn outcome(&mut self, _status: GazeStatus) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI logger: throttled progress, per-stage timing and an outcome tally.
pub struct StdoutPipelineLogger {
    throttle: usize,
    timings: HashMap<String, Vec<f64>>,
    outcomes: BTreeMap<String, usize>,
    start_time: Instant,
    total: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            timings: HashMap::new(),
            outcomes: BTreeMap::new(),
            start_time: Instant::now(),
            total: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.outcomes.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let processed: usize = self.outcomes.values().sum();
        let count = if self.total > processed {
            format!("{processed}/{}", self.total)
        } else {
            processed.to_string()
        };
        let mut lines = vec![format!(
            "Gaze summary ({count} images, {elapsed_s:.1}s total):"
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  max {max_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        if !self.outcomes.is_empty() {
            let tally: Vec<String> = self
                .outcomes
                .iter()
                .map(|(status, n)| format!("{status}={n}"))
                .collect();
            lines.push(format!("  Outcomes: {}", tally.join(" ")));
        }

        if processed > 0 && elapsed_s > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} images/s",
                processed as f64 / elapsed_s
            ));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn count_for(&self, status: GazeStatus) -> usize {
        self.outcomes.get(&status.to_string()).copied().unwrap_or(0)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.total = total;
        if total > 0 && (current % self.throttle == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Analyzing: {current}/{total} images ({pct:.1}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn outcome(&mut self, status: GazeStatus) {
        *self.outcomes.entry(status.to_string()).or_default() += 1;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10);
        logger.timing("analyze", 5.0);
        logger.outcome(GazeStatus::Ok);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("analyze", 20.0);
        logger.timing("analyze", 30.0);
        logger.timing("read", 5.0);

        assert_eq!(logger.timings_for("analyze").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for("read").unwrap().len(), 1);
        assert!(logger.timings_for("decode").is_none());
    }

    #[test]
    fn test_outcomes_are_tallied() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.outcome(GazeStatus::Ok);
        logger.outcome(GazeStatus::Ok);
        logger.outcome(GazeStatus::NoFace);

        assert_eq!(logger.count_for(GazeStatus::Ok), 2);
        assert_eq!(logger.count_for(GazeStatus::NoFace), 1);
        assert_eq!(logger.count_for(GazeStatus::Closed), 0);
    }

    #[test]
    fn test_summary_lists_stages_and_outcomes() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("analyze", 12.0);
        logger.outcome(GazeStatus::Closed);
        logger.outcome(GazeStatus::Ok);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Gaze summary (2 images"));
        assert!(summary.contains("analyze"));
        assert!(summary.contains("closed=1 ok=1"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_summary_shows_partial_runs_against_total() {
        let mut logger = StdoutPipelineLogger::new(3);
        for i in 1..=2 {
            logger.progress(i, 7);
            logger.outcome(GazeStatus::Ok);
        }
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Gaze summary (2/7 images"), "{summary}");
    }

    #[test]
    fn test_default_throttle() {
        let mut logger = StdoutPipelineLogger::default();
        logger.info("backend: heuristic");
        assert_eq!(logger.throttle, 10);
    }
}
