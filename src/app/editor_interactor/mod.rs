// Editor interactor - Orchestrates one trim editing session

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::drag_controller::{DragContext, DragController, DragOutcome, PointerEvent};
use crate::app::playback::PlaybackController;
use crate::app::shortcuts::{KeyEvent, KeyboardShortcuts, ShortcutAction};
use crate::app::subscription::Subscription;
use crate::config::EditorConfig;
use crate::domain::errors::*;
use crate::domain::history::HistoryStack;
use crate::domain::model::*;
use crate::domain::rules::TrimRangeModel;
use crate::engine::export::{ExportOutcome, ExportPipeline, ExportPorts, ExportRequest, ExportSettings};
use crate::ports::*;

/// Ports an editor session is wired to
#[derive(Clone)]
pub struct EditorPorts {
    pub playback: Arc<dyn PlaybackPort>,
    pub canvas: Arc<dyn CanvasPort>,
    pub encoder: Arc<dyn EncoderPort>,
    pub clock: Arc<dyn FrameClockPort>,
    pub ui: Arc<dyn UiSurfacePort>,
}

/// One mounted trim editor.
///
/// Every user-initiated change to the range records a history snapshot
/// before it is applied. Until the clip metadata arrives every editing
/// operation is inert.
pub struct TrimEditor {
    source: SourceClip,
    config: EditorConfig,
    model: TrimRangeModel,
    history: HistoryStack,
    drag: DragController,
    shortcuts: KeyboardShortcuts,
    playback: PlaybackController,
    export: Arc<ExportPipeline>,
    track: TrackGeometry,
    zoom: f64,
    _keyboard: Subscription,
}

impl TrimEditor {
    /// Mount the editor on `source`
    pub fn mount(source: SourceClip, ports: EditorPorts, config: EditorConfig) -> Result<Self, DomainError> {
        config.validate()?;
        let shortcuts = KeyboardShortcuts::from_bindings(&config.keybindings)?;
        let export = Arc::new(ExportPipeline::new(
            ExportPorts {
                playback: Arc::clone(&ports.playback),
                canvas: ports.canvas,
                encoder: ports.encoder,
                clock: ports.clock,
            },
            ExportSettings::from(&config),
        ));
        info!(url = %source.url, bytes = source.blob.len(), "Editor mounted");

        Ok(Self {
            model: TrimRangeModel::new(config.minimum_span),
            history: HistoryStack::new(config.history_limit),
            drag: DragController::new(Arc::clone(&ports.ui), config.handle_hot_zone_px),
            _keyboard: Subscription::attach(Arc::clone(&ports.ui), ListenerScope::Keyboard),
            playback: PlaybackController::new(ports.playback),
            zoom: config.zoom,
            track: TrackGeometry::new(0.0, 1000.0),
            shortcuts,
            export,
            source,
            config,
        })
    }

    /// Wait for the playback surface to report the clip duration
    pub async fn load_metadata(&mut self) -> Result<f64, DomainError> {
        let duration = self.playback.port().wait_for_metadata().await?;
        if !self.on_metadata_loaded(duration) {
            return Err(DomainError::InvalidFormat(format!(
                "Clip reports an unusable duration of {}",
                duration
            )));
        }
        Ok(duration)
    }

    /// Duration became known: select the whole clip and start a fresh history
    pub fn on_metadata_loaded(&mut self, duration: f64) -> bool {
        if !self.model.set_duration(duration) {
            return false;
        }
        self.history.clear();
        debug!(duration, "Metadata loaded");
        true
    }

    pub fn source(&self) -> &SourceClip {
        &self.source
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn duration(&self) -> Option<f64> {
        self.model.duration()
    }

    pub fn range(&self) -> Option<TrimRange> {
        self.model.range()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn export_pipeline(&self) -> Arc<ExportPipeline> {
        Arc::clone(&self.export)
    }

    pub fn export_state(&self) -> ExportState {
        self.export.state()
    }

    pub fn track(&self) -> TrackGeometry {
        self.track
    }

    /// Track placement in pixels, as laid out by the host
    pub fn set_track(&mut self, track: TrackGeometry) {
        self.track = track;
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = if zoom.is_finite() { zoom.max(0.0) } else { 0.0 };
    }

    /// Visible window of the timeline
    pub fn viewport(&self) -> Option<TimelineViewport> {
        let duration = self.model.duration()?;
        let range = self.model.range()?;
        Some(TimelineViewport::derive(&range, duration, self.zoom))
    }

    fn record_history(&mut self) {
        if let Some(range) = self.model.range() {
            self.history.push(range);
        }
    }

    /// Quick-trim: drop `seconds` off the front of the range
    pub fn remove_from_start(&mut self, seconds: f64) -> Option<TrimRange> {
        self.model.duration()?;
        self.record_history();
        self.model.remove_from_start(seconds);
        self.range()
    }

    /// Quick-trim: drop `seconds` off the back of the range
    pub fn remove_from_end(&mut self, seconds: f64) -> Option<TrimRange> {
        self.model.duration()?;
        self.record_history();
        self.model.remove_from_end(seconds);
        self.range()
    }

    /// Quick-trim by the configured step from the front
    pub fn quick_trim_start(&mut self) -> Option<TrimRange> {
        self.remove_from_start(self.config.quick_trim_seconds)
    }

    /// Quick-trim by the configured step from the back
    pub fn quick_trim_end(&mut self) -> Option<TrimRange> {
        self.remove_from_end(self.config.quick_trim_seconds)
    }

    /// Select the whole clip again
    pub fn reset(&mut self) -> Option<TrimRange> {
        self.model.duration()?;
        self.record_history();
        self.model.reset();
        self.range()
    }

    /// Set both bounds in one undoable step, clamped like a drag would be
    pub fn set_range(&mut self, start: f64, end: f64) -> Option<TrimRange> {
        let duration = self.model.duration()?;
        self.record_history();
        self.model.restore(TrimRange::new(start.max(0.0), end.min(duration)));
        self.range()
    }

    fn drag_context(&self) -> Option<DragContext> {
        Some(DragContext {
            range: self.model.range()?,
            duration: self.model.duration()?,
            viewport: self.viewport()?,
            track: self.track,
        })
    }

    /// Feed one pointer event through the drag controller and apply it
    pub fn handle_pointer(&mut self, event: PointerEvent) -> DragOutcome {
        let ctx = self.drag_context();
        let outcome = self.drag.handle(event, ctx.as_ref());
        match outcome {
            DragOutcome::Started(_) => self.record_history(),
            DragOutcome::Moved { handle, time } => {
                self.model.set_bound(handle, time);
            }
            DragOutcome::Seek(time) => self.playback.port().set_current_time(time),
            DragOutcome::Ignored | DragOutcome::Discarded | DragOutcome::Ended(_) => {}
        }
        outcome
    }

    /// Apply a keyboard shortcut. Returns the action that fired, if any.
    pub fn handle_key(&mut self, event: &KeyEvent, focus_in_text_input: bool) -> Option<ShortcutAction> {
        let action = self.shortcuts.resolve(event, focus_in_text_input)?;
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
        }
        Some(action)
    }

    pub fn can_undo(&self) -> bool {
        self.model
            .range()
            .is_some_and(|current| self.history.can_undo(&current))
    }

    pub fn can_redo(&self) -> bool {
        self.model.range().is_some() && self.history.can_redo()
    }

    /// Step back one snapshot and move the playhead to its start
    pub fn undo(&mut self) -> Option<TrimRange> {
        let current = self.model.range()?;
        let entry = self.history.undo(current)?;
        self.apply_snapshot(entry)
    }

    /// Step forward one snapshot and move the playhead to its start
    pub fn redo(&mut self) -> Option<TrimRange> {
        self.model.range()?;
        let entry = self.history.redo()?;
        self.apply_snapshot(entry)
    }

    fn apply_snapshot(&mut self, entry: HistoryEntry) -> Option<TrimRange> {
        self.model.restore(entry);
        let range = self.model.range()?;
        self.playback.port().set_current_time(range.start);
        debug!(%range, cursor = self.history.cursor(), "History step applied");
        Some(range)
    }

    /// Time-update tick from the playback surface: keep the playhead inside
    /// the range, pausing at its end.
    pub fn on_time_update(&self) -> Option<f64> {
        let range = self.model.range()?;
        Some(self.playback.clamp_to_range(&range))
    }

    /// Play or pause the preview within the trim range
    pub async fn toggle_play(&self) -> Result<bool, DomainError> {
        self.playback.toggle_play(self.model.range()).await
    }

    /// Export the current range.
    ///
    /// The range is captured when this is called. The returned future does
    /// not borrow the editor, so the editor may be closed while it runs.
    pub fn export(&self) -> impl Future<Output = Result<ExportOutcome, DomainError>> + Send + 'static {
        let pipeline = Arc::clone(&self.export);
        let request = match (self.model.range(), self.model.duration()) {
            (Some(range), Some(duration)) => Ok(ExportRequest {
                source: self.source.blob.clone(),
                range,
                duration,
            }),
            _ => Err(DomainError::BadArgs("Clip metadata has not loaded yet".to_string())),
        };
        async move { pipeline.export(request?).await }
    }

    /// Cancel the running export, if any
    pub fn cancel_export(&self) -> bool {
        self.export.cancel()
    }

    /// Tear the editor down: stop any export and release UI overrides
    pub fn close(&mut self) {
        if self.export.cancel() {
            warn!("Editor closed while an export was running");
        }
        self.drag.release();
    }
}

impl Drop for TrimEditor {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::raw_video::generate_test_pattern;
    use crate::adapters::{HeadlessUi, RawVideoEncoder, RawVideoPlayback, TickerFrameClock};

    fn editor(seconds: f64) -> (TrimEditor, Arc<HeadlessUi>) {
        let blob = generate_test_pattern(2, 2, 10, seconds).unwrap();
        let playback = Arc::new(RawVideoPlayback::open(blob.clone()).unwrap());
        let ui = Arc::new(HeadlessUi::new());
        let ports = EditorPorts {
            playback: playback.clone(),
            canvas: playback,
            encoder: Arc::new(RawVideoEncoder::new()),
            clock: Arc::new(TickerFrameClock::default()),
            ui: ui.clone(),
        };
        let editor = TrimEditor::mount(SourceClip::new(blob, "memory://clip"), ports, EditorConfig::default()).unwrap();
        (editor, ui)
    }

    #[test]
    fn test_inert_until_metadata() {
        let (mut editor, _ui) = editor(10.0);
        assert_eq!(editor.range(), None);
        assert_eq!(editor.remove_from_start(1.0), None);
        assert_eq!(editor.reset(), None);
        assert_eq!(editor.undo(), None);
        assert_eq!(editor.handle_pointer(PointerEvent::Down { x: 0.0 }), DragOutcome::Ignored);
        assert!(editor.history().is_empty());
    }

    #[test]
    fn test_quick_trim_records_history() {
        let (mut editor, _ui) = editor(100.0);
        editor.on_metadata_loaded(100.0);

        assert_eq!(editor.quick_trim_start(), Some(TrimRange::new(10.0, 100.0)));
        assert_eq!(editor.quick_trim_end(), Some(TrimRange::new(10.0, 90.0)));
        assert_eq!(editor.history().len(), 2);
        assert_eq!(editor.undo(), Some(TrimRange::new(10.0, 100.0)));
        assert_eq!(editor.playback().port().current_time(), 10.0);
    }

    #[test]
    fn test_keyboard_listener_lives_with_editor() {
        let (editor, ui) = editor(5.0);
        assert_eq!(ui.active_listeners(ListenerScope::Keyboard), 1);
        drop(editor);
        assert_eq!(ui.total_listeners(), 0);
    }

    #[test]
    fn test_zoom_is_never_negative() {
        let (mut editor, _ui) = editor(5.0);
        editor.set_zoom(-3.0);
        assert_eq!(editor.zoom(), 0.0);
        editor.set_zoom(f64::INFINITY);
        assert_eq!(editor.zoom(), 0.0);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_export_before_metadata_is_rejected() {
        let (editor, _ui) = editor(5.0);
        assert!(matches!(editor.export().await, Err(DomainError::BadArgs(_))));
    }
}
