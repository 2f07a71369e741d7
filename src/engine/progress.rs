//! Export progress tracking and callbacks for UI integration

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Receives export progress notifications
pub trait ProgressCallback: Send + Sync {
    /// Export started; `span` is the length of media being captured
    fn on_start(&self, span: f64);

    /// Capture advanced
    fn on_progress(&self, info: &ProgressInfo);

    fn on_complete(&self, info: &ProgressInfo);

    /// Export failed; `error` is the user-facing message
    fn on_error(&self, error: &str);

    fn on_cancel(&self);
}

/// Snapshot of export progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressInfo {
    pub phase: ProgressPhase,
    /// Share of the trim range captured (0.0 - 100.0)
    pub percent: f64,
    /// Frames fed to the encoder so far
    pub frames: u64,
    /// Media time of the last captured frame
    pub media_time: f64,
    pub message: String,
    pub elapsed: Duration,
}

/// Export phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressPhase {
    Preparing,
    /// Waiting for the playhead to land on the range start
    Seeking,
    Capturing,
    /// Encoder is flushing its output
    Finalizing,
    Complete,
    Failed,
    Cancelled,
}

/// Progress tracker shared between the capture loop and observers
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<Mutex<TrackerInner>>,
    callbacks: Arc<Mutex<Vec<Arc<dyn ProgressCallback>>>>,
}

struct TrackerInner {
    info: ProgressInfo,
    start: f64,
    end: f64,
    started_at: Instant,
    last_notify: Option<Instant>,
    notify_interval: Duration,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackerInner {
                info: ProgressInfo {
                    phase: ProgressPhase::Preparing,
                    percent: 0.0,
                    frames: 0,
                    media_time: 0.0,
                    message: String::new(),
                    elapsed: Duration::ZERO,
                },
                start: 0.0,
                end: 0.0,
                started_at: Instant::now(),
                last_notify: None,
                notify_interval: Duration::from_millis(100),
            })),
            callbacks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_callback(&self, callback: Arc<dyn ProgressCallback>) {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(callback);
    }

    /// Begin tracking a capture of `[start, end]`
    pub fn start(&self, start: f64, end: f64) {
        {
            let mut inner = self.lock();
            inner.start = start;
            inner.end = end;
            inner.started_at = Instant::now();
            inner.last_notify = None;
            inner.info = ProgressInfo {
                phase: ProgressPhase::Preparing,
                percent: 0.0,
                frames: 0,
                media_time: start,
                message: "Preparing export".to_string(),
                elapsed: Duration::ZERO,
            };
        }
        self.notify(|cb| cb.on_start(end - start));
    }

    pub fn set_phase(&self, phase: ProgressPhase, message: impl Into<String>) {
        let mut inner = self.lock();
        inner.info.phase = phase;
        inner.info.message = message.into();
        inner.info.elapsed = inner.started_at.elapsed();
    }

    /// Record one captured frame at `media_time`
    pub fn frame_captured(&self, media_time: f64) {
        let snapshot = {
            let mut inner = self.lock();
            inner.info.frames += 1;
            inner.info.media_time = media_time;
            inner.info.percent = crate::utils::Utils::calculate_progress(media_time - inner.start, inner.end - inner.start);
            inner.info.elapsed = inner.started_at.elapsed();

            let now = Instant::now();
            let due = inner
                .last_notify
                .map_or(true, |last| now.duration_since(last) >= inner.notify_interval);
            if !due {
                return;
            }
            inner.last_notify = Some(now);
            inner.info.clone()
        };
        self.notify(|cb| cb.on_progress(&snapshot));
    }

    pub fn complete(&self) {
        let snapshot = self.finish(ProgressPhase::Complete, "Export complete");
        self.notify(|cb| cb.on_complete(&snapshot));
    }

    pub fn error(&self, message: &str) {
        self.finish(ProgressPhase::Failed, message);
        self.notify(|cb| cb.on_error(message));
    }

    pub fn cancel(&self) {
        self.finish(ProgressPhase::Cancelled, "Export cancelled");
        self.notify(|cb| cb.on_cancel());
    }

    fn finish(&self, phase: ProgressPhase, message: &str) -> ProgressInfo {
        let mut inner = self.lock();
        inner.info.phase = phase;
        inner.info.message = message.to_string();
        inner.info.elapsed = inner.started_at.elapsed();
        if phase == ProgressPhase::Complete {
            inner.info.percent = 100.0;
        }
        inner.info.clone()
    }

    pub fn info(&self) -> ProgressInfo {
        self.lock().info.clone()
    }

    fn notify<F>(&self, f: F)
    where
        F: Fn(&dyn ProgressCallback),
    {
        let callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for callback in callbacks.iter() {
            f(callback.as_ref());
        }
    }
}

/// Progress bar on stderr for interactive CLI use
pub struct ConsoleProgressCallback {
    verbose: bool,
}

impl ConsoleProgressCallback {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_start(&self, span: f64) {
        if self.verbose {
            eprintln!("Exporting {:.3}s of video", span);
        }
    }

    fn on_progress(&self, info: &ProgressInfo) {
        let bar_length = 20;
        let filled = ((info.percent / 100.0) * bar_length as f64) as usize;
        let filled = filled.min(bar_length);
        let bar = "#".repeat(filled) + &"-".repeat(bar_length - filled);
        eprint!("\r[{}] {:>5.1}% {} frames", bar, info.percent, info.frames);
    }

    fn on_complete(&self, info: &ProgressInfo) {
        eprintln!("\rExport complete: {} frames in {:.2?}", info.frames, info.elapsed);
    }

    fn on_error(&self, error: &str) {
        eprintln!("\r{}", error);
    }

    fn on_cancel(&self) {
        eprintln!("\rExport cancelled");
    }
}

/// Newline-delimited JSON progress events on stdout
pub struct JsonProgressCallback {
    output_progress_events: bool,
}

impl JsonProgressCallback {
    pub fn new(output_progress_events: bool) -> Self {
        Self { output_progress_events }
    }
}

impl ProgressCallback for JsonProgressCallback {
    fn on_start(&self, span: f64) {
        if self.output_progress_events {
            let event = serde_json::json!({
                "event": "start",
                "span": span,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });
            println!("{}", event);
        }
    }

    fn on_progress(&self, info: &ProgressInfo) {
        if self.output_progress_events {
            let event = serde_json::json!({
                "event": "progress",
                "percent": info.percent,
                "frames": info.frames,
                "media_time": info.media_time,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });
            println!("{}", event);
        }
    }

    fn on_complete(&self, info: &ProgressInfo) {
        let event = serde_json::json!({
            "event": "complete",
            "frames": info.frames,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }

    fn on_error(&self, error: &str) {
        let event = serde_json::json!({
            "event": "error",
            "error": error,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }

    fn on_cancel(&self) {
        let event = serde_json::json!({
            "event": "cancel",
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }
}
