use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting observer for pipeline events.
///
/// Decouples the use cases from a specific output mechanism so callers can
/// observe progress without changing orchestration code.
pub trait PipelineLogger: Send {
    /// Report frame-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-pipeline summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger for tests and embedding callers with their own reporting.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Aggregate per stage: call count and accumulated milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct StageTotal {
    calls: usize,
    total_ms: f64,
}

/// `log`-crate backed logger with per-stage timing aggregation.
///
/// Progress lines are throttled to every `throttle_frames` frames to avoid
/// flooding output on long sequences.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    stages: HashMap<String, StageTotal>,
    start_time: Instant,
    frames_seen: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            stages: HashMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
        }
    }

    /// Formatted run summary, or `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.stages.is_empty() && self.frames_seen == 0 {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Run summary: {} frames in {elapsed_s:.1}s",
            self.frames_seen
        )];

        let mut names: Vec<&String> = self.stages.keys().collect();
        names.sort();
        for name in names {
            let stage = &self.stages[name];
            let avg = if stage.calls > 0 {
                stage.total_ms / stage.calls as f64
            } else {
                0.0
            };
            lines.push(format!(
                "  {name}: {} calls, avg {avg:.1}ms, total {:.0}ms",
                stage.calls, stage.total_ms
            ));
        }
        Some(lines.join("\n"))
    }

    #[cfg(test)]
    fn stage(&self, name: &str) -> Option<StageTotal> {
        self.stages.get(name).copied()
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = self.frames_seen.max(current);
        if current % self.throttle_frames == 0 || current == total {
            if total > 0 {
                let pct = current as f64 / total as f64 * 100.0;
                log::info!("Processing: {current}/{total} frames ({pct:.1}%)");
            } else {
                log::info!("Processing: frame {current}");
            }
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        let entry = self.stages.entry(stage.to_string()).or_default();
        entry.calls += 1;
        entry.total_ms += duration_ms;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}
