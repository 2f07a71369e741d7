//! Export pipeline: replays the trim range through the playback surface,
//! captures each animation frame and encodes the result.
//!
//! State machine: Idle -> Processing -> Complete | Failed | Cancelled.
//! Only one export runs per pipeline at a time.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::app::playback::PlaybackController;
use crate::config::EditorConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::engine::progress::{ProgressPhase, ProgressTracker};
use crate::ports::*;

/// Message shown to the user for every failed export
pub const EXPORT_FAILED_MESSAGE: &str = "Export failed, please try again.";

/// Encoding parameters for an export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSettings {
    pub fps: u32,
    /// Upper bound on the initial seek to the range start
    pub seek_timeout: Duration,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for ExportSettings {
    fn from(config: &EditorConfig) -> Self {
        Self {
            fps: config.export_fps,
            seek_timeout: Duration::from_millis(config.seek_timeout_ms),
        }
    }
}

/// What to export
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub source: MediaBlob,
    pub range: TrimRange,
    pub duration: f64,
}

/// How an export ended
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Complete(MediaBlob),
    /// `message` is safe to show to the user; the cause is logged
    Failed { message: String },
    Cancelled,
}

impl ExportOutcome {
    pub fn state(&self) -> ExportState {
        match self {
            ExportOutcome::Complete(_) => ExportState::Complete,
            ExportOutcome::Failed { .. } => ExportState::Failed,
            ExportOutcome::Cancelled => ExportState::Cancelled,
        }
    }

    pub fn blob(&self) -> Option<&MediaBlob> {
        match self {
            ExportOutcome::Complete(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn into_blob(self) -> Option<MediaBlob> {
        match self {
            ExportOutcome::Complete(blob) => Some(blob),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    state: ExportState,
    cancel: Option<CancellationToken>,
}

/// Collaborators the capture loop drives
#[derive(Clone)]
pub struct ExportPorts {
    pub playback: Arc<dyn PlaybackPort>,
    pub canvas: Arc<dyn CanvasPort>,
    pub encoder: Arc<dyn EncoderPort>,
    pub clock: Arc<dyn FrameClockPort>,
}

/// Runs exports for one editor
pub struct ExportPipeline {
    ports: ExportPorts,
    settings: ExportSettings,
    slot: Mutex<Slot>,
    progress: ProgressTracker,
}

/// Marks the pipeline Processing for its lifetime. Dropping it early (the
/// export future was dropped) leaves the pipeline Cancelled and puts the
/// playback surface back where it was, paused.
struct ProcessingGuard<'a> {
    pipeline: &'a ExportPipeline,
    saved: Option<(PlaybackController, PlaybackState)>,
    finished: bool,
}

impl<'a> ProcessingGuard<'a> {
    fn remember_playback(&mut self, controller: PlaybackController, state: PlaybackState) {
        self.saved = Some((controller, state));
    }

    /// Hand back the saved playback state for an async restore
    fn take_playback(&mut self) -> Option<(PlaybackController, PlaybackState)> {
        self.saved.take()
    }

    fn finish(mut self, state: ExportState) {
        self.finished = true;
        let mut slot = self.pipeline.lock();
        slot.state = state;
        slot.cancel = None;
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Some((controller, state)) = self.saved.take() {
            controller.restore_paused(&state);
            if state.is_playing {
                warn!("Export dropped mid-capture, playback left paused");
            }
        }
        let mut slot = self.pipeline.lock();
        slot.state = ExportState::Cancelled;
        slot.cancel = None;
        debug!("Export dropped before completion");
    }
}

impl ExportPipeline {
    pub fn new(ports: ExportPorts, settings: ExportSettings) -> Self {
        Self {
            ports,
            settings,
            slot: Mutex::new(Slot {
                state: ExportState::Idle,
                cancel: None,
            }),
            progress: ProgressTracker::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ExportState {
        self.lock().state
    }

    pub fn settings(&self) -> ExportSettings {
        self.settings
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Stop a running export. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        match self.lock().cancel.as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn begin(&self) -> Result<(ProcessingGuard<'_>, CancellationToken), DomainError> {
        let mut slot = self.lock();
        if slot.state == ExportState::Processing {
            return Err(DomainError::ExportInProgress);
        }
        let token = CancellationToken::new();
        slot.state = ExportState::Processing;
        slot.cancel = Some(token.clone());
        Ok((
            ProcessingGuard {
                pipeline: self,
                saved: None,
                finished: false,
            },
            token,
        ))
    }

    /// Export `request.range` of the source.
    ///
    /// Rejects with [`DomainError::ExportInProgress`] while another export
    /// runs; every other failure is reported as [`ExportOutcome::Failed`].
    #[instrument(skip(self, request), fields(range = %request.range, duration = request.duration))]
    pub async fn export(&self, request: ExportRequest) -> Result<ExportOutcome, DomainError> {
        let (mut guard, token) = self.begin()?;
        let range = request.range;
        self.progress.start(range.start, range.end);

        if range.is_full(request.duration) {
            info!("Range covers the whole clip, returning the source unchanged");
            self.progress.complete();
            guard.finish(ExportState::Complete);
            return Ok(ExportOutcome::Complete(request.source));
        }

        let controller = PlaybackController::new(Arc::clone(&self.ports.playback));
        let saved = controller.snapshot();
        guard.remember_playback(controller, saved);

        let result = tokio::select! {
            _ = token.cancelled() => Err(DomainError::Cancelled),
            result = self.capture(range) => result,
        };

        if let Some((controller, saved)) = guard.take_playback() {
            if let Err(e) = controller.restore(&saved).await {
                warn!(error = %e, "Could not restore playback state after export");
            }
        }

        let outcome = match result {
            Ok(blob) => {
                info!(bytes = blob.len(), "Export complete");
                self.progress.complete();
                ExportOutcome::Complete(blob)
            }
            Err(DomainError::Cancelled) => {
                info!("Export cancelled");
                self.progress.cancel();
                ExportOutcome::Cancelled
            }
            Err(e) => {
                warn!(error = %e, capture = e.is_capture_error(), "Export failed");
                self.progress.error(EXPORT_FAILED_MESSAGE);
                ExportOutcome::Failed {
                    message: EXPORT_FAILED_MESSAGE.to_string(),
                }
            }
        };
        guard.finish(outcome.state());
        Ok(outcome)
    }

    /// The capture loop. Dropping this future discards the encoder session.
    async fn capture(&self, range: TrimRange) -> Result<MediaBlob, DomainError> {
        let playback = &self.ports.playback;
        let (width, height) = playback
            .video_size()
            .ok_or_else(|| DomainError::CaptureFail("Video size is unknown".to_string()))?;

        let mut canvas = self.ports.canvas.acquire_context(width, height)?;
        let mut sink = self.ports.encoder.start(&EncoderSettings {
            width,
            height,
            fps: self.settings.fps,
        })?;

        self.progress.set_phase(ProgressPhase::Seeking, "Seeking to range start");
        playback.pause();
        playback.set_playback_rate(1.0);
        tokio::time::timeout(self.settings.seek_timeout, playback.seek(range.start))
            .await
            .map_err(|_| DomainError::SeekTimeout {
                target: range.start,
                timeout_ms: self.settings.seek_timeout.as_millis() as u64,
            })??;

        self.progress.set_phase(ProgressPhase::Capturing, "Capturing frames");
        playback.play().await?;
        debug!(start = range.start, end = range.end, "Capture loop running");

        loop {
            let t = playback.current_time();
            if t >= range.end {
                break;
            }
            if !playback.is_playing() {
                return Err(DomainError::PlaybackFail(format!(
                    "Playback stopped at {:.3}s before the range end",
                    t
                )));
            }
            let frame = canvas.draw_frame()?;
            sink.feed(frame, (t - range.start).max(0.0)).await?;
            self.progress.frame_captured(t);
            self.ports.clock.next_frame().await;
        }

        playback.pause();
        self.progress.set_phase(ProgressPhase::Finalizing, "Finalizing output");
        let chunks = sink.finish(range.span()).await?;
        Ok(MediaBlob::from_chunks(chunks, sink.mime_type()))
    }
}
