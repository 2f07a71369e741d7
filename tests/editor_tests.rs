use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cliptrim::adapters::raw_video::{generate_test_pattern, stamped_index, RawVideo};
use cliptrim::adapters::{HeadlessUi, RawVideoEncoder, RawVideoPlayback, TickerFrameClock};
use cliptrim::app::drag_controller::{DragOutcome, PointerEvent};
use cliptrim::app::shortcuts::KeyEvent;
use cliptrim::domain::model::*;
use cliptrim::ports::*;
use cliptrim::*;

/// Test doubles and builders
mod test_utils {
    use super::*;

    pub const FPS: u32 = 10;

    pub fn clip(seconds: f64) -> MediaBlob {
        generate_test_pattern(4, 4, FPS, seconds).unwrap()
    }

    /// Canvas that counts context acquisitions and can refuse them
    pub struct ProbeCanvas {
        pub inner: RawVideoPlayback,
        pub acquired: AtomicUsize,
        pub refuse: bool,
    }

    impl CanvasPort for ProbeCanvas {
        fn acquire_context(&self, width: u32, height: u32) -> Result<Box<dyn DrawContext>, DomainError> {
            self.acquired.fetch_add(1, Ordering::SeqCst);
            if self.refuse {
                return Err(DomainError::CaptureFail("2d context unavailable".to_string()));
            }
            self.inner.acquire_context(width, height)
        }
    }

    /// Encoder whose sessions fail after a number of frames
    pub struct BrokenEncoder {
        pub fail_after: usize,
    }

    struct BrokenSink {
        remaining: usize,
    }

    impl EncoderPort for BrokenEncoder {
        fn start(&self, _settings: &EncoderSettings) -> Result<Box<dyn EncoderSink>, DomainError> {
            Ok(Box::new(BrokenSink {
                remaining: self.fail_after,
            }))
        }
    }

    #[async_trait]
    impl EncoderSink for BrokenSink {
        fn mime_type(&self) -> &str {
            "video/broken"
        }

        async fn feed(&mut self, _frame: VideoFrame, _pts: f64) -> Result<(), DomainError> {
            if self.remaining == 0 {
                return Err(DomainError::EncoderFail("encoder crashed".to_string()));
            }
            self.remaining -= 1;
            Ok(())
        }

        async fn finish(&mut self, _final_pts: f64) -> Result<Vec<Vec<u8>>, DomainError> {
            Ok(vec![b"partial".to_vec()])
        }
    }

    pub struct Harness {
        pub editor: TrimEditor,
        pub playback: RawVideoPlayback,
        pub canvas: Arc<ProbeCanvas>,
        pub ui: Arc<HeadlessUi>,
        pub source: MediaBlob,
    }

    pub struct Options {
        pub seconds: f64,
        pub config: EditorConfig,
        pub stalled_seeks: bool,
        pub refuse_canvas: bool,
        pub encoder: Option<Arc<dyn EncoderPort>>,
    }

    impl Default for Options {
        fn default() -> Self {
            Self {
                seconds: 100.0,
                config: EditorConfig::default(),
                stalled_seeks: false,
                refuse_canvas: false,
                encoder: None,
            }
        }
    }

    pub fn harness(options: Options) -> Harness {
        let source = clip(options.seconds);
        let mut playback = RawVideoPlayback::open(source.clone()).unwrap();
        if options.stalled_seeks {
            playback = playback.with_stalled_seeks();
        }
        let canvas = Arc::new(ProbeCanvas {
            inner: playback.clone(),
            acquired: AtomicUsize::new(0),
            refuse: options.refuse_canvas,
        });
        let ui = Arc::new(HeadlessUi::new());
        let ports = EditorPorts {
            playback: Arc::new(playback.clone()),
            canvas: canvas.clone(),
            encoder: options
                .encoder
                .unwrap_or_else(|| Arc::new(RawVideoEncoder::new()) as Arc<dyn EncoderPort>),
            clock: Arc::new(TickerFrameClock::new(Duration::from_millis(options.config.frame_interval_ms))),
            ui: ui.clone(),
        };
        let mut editor = TrimEditor::mount(SourceClip::new(source.clone(), "memory://clip"), ports, options.config).unwrap();
        editor.on_metadata_loaded(options.seconds);
        editor.set_track(TrackGeometry::new(0.0, 1000.0));
        Harness {
            editor,
            playback,
            canvas,
            ui,
            source,
        }
    }

    pub fn default_harness() -> Harness {
        harness(Options::default())
    }

    /// Drag a handle from `from_x` to `to_x` on a 1000px track
    pub fn drag(editor: &mut TrimEditor, from_x: f64, to_x: f64) {
        assert!(matches!(
            editor.handle_pointer(PointerEvent::Down { x: from_x }),
            DragOutcome::Started(_)
        ));
        editor.handle_pointer(PointerEvent::Move { x: to_x });
        editor.handle_pointer(PointerEvent::Up);
    }
}

use test_utils::*;

#[test]
fn test_drag_quick_trim_undo_scenario() {
    let mut h = default_harness();
    let editor = &mut h.editor;

    drag(editor, 1000.0, 400.0);
    assert_eq!(editor.range(), Some(TrimRange::new(0.0, 40.0)));

    editor.remove_from_start(10.0);
    assert_eq!(editor.range(), Some(TrimRange::new(10.0, 40.0)));

    assert_eq!(editor.undo(), Some(TrimRange::new(0.0, 40.0)));
    assert_eq!(editor.undo(), Some(TrimRange::new(0.0, 100.0)));
    assert_eq!(editor.undo(), None);

    assert_eq!(editor.redo(), Some(TrimRange::new(0.0, 40.0)));
    assert_eq!(editor.redo(), Some(TrimRange::new(10.0, 40.0)));
    assert_eq!(editor.redo(), None);
}

#[test]
fn test_n_mutations_then_n_undos_restore_initial() {
    let mut h = default_harness();
    let editor = &mut h.editor;
    let initial = editor.range().unwrap();

    editor.quick_trim_start();
    drag(editor, 1000.0, 800.0);
    editor.remove_from_end(5.0);
    editor.set_range(20.0, 60.0);
    let last = editor.range().unwrap();

    for _ in 0..4 {
        assert!(editor.undo().is_some());
    }
    assert_eq!(editor.range(), Some(initial));
    assert!(!editor.can_undo());

    for _ in 0..4 {
        assert!(editor.redo().is_some());
    }
    assert_eq!(editor.range(), Some(last));
}

#[test]
fn test_push_after_undo_truncates_redo() {
    let mut h = default_harness();
    let editor = &mut h.editor;

    editor.remove_from_start(10.0);
    editor.remove_from_start(10.0);
    editor.undo();
    assert!(editor.can_redo());

    editor.remove_from_end(30.0);
    assert!(!editor.can_redo());
    assert_eq!(editor.range(), Some(TrimRange::new(10.0, 70.0)));
    assert_eq!(editor.redo(), None);
}

#[test]
fn test_undo_moves_playhead_to_restored_start() {
    let mut h = default_harness();
    h.editor.set_range(30.0, 50.0);
    h.editor.remove_from_start(5.0);
    h.playback.set_current_time(48.0);

    h.editor.undo();
    assert_eq!(h.playback.current_time(), 30.0);
}

#[test]
fn test_start_drag_clamps_to_minimum_span() {
    let mut h = default_harness();
    let editor = &mut h.editor;
    editor.set_range(0.0, 40.0);

    // Start handle sits at x=0; drag it well past the end handle.
    drag(editor, 0.0, 900.0);
    assert_eq!(editor.range(), Some(TrimRange::new(39.5, 40.0)));
}

#[test]
fn test_zoomed_drag_maps_through_frozen_viewport() {
    let mut h = default_harness();
    let editor = &mut h.editor;
    editor.set_range(20.0, 60.0);
    editor.set_zoom(1.0);

    let viewport = editor.viewport().unwrap();
    assert_eq!(viewport.visible_start, 10.0);
    assert_eq!(viewport.visible_end, 80.0);

    let end_x = viewport.time_to_x(60.0, &editor.track());
    drag(editor, end_x, 500.0);
    assert_eq!(editor.range(), Some(TrimRange::new(20.0, 45.0)));

    assert_eq!(editor.undo(), Some(TrimRange::new(20.0, 60.0)));
}

#[test]
fn test_keyboard_shortcuts_drive_history() {
    let mut h = default_harness();
    let editor = &mut h.editor;
    editor.remove_from_end(20.0);

    editor.handle_key(&KeyEvent::new("z").ctrl(), true);
    assert_eq!(editor.range(), Some(TrimRange::new(0.0, 80.0)));

    editor.handle_key(&KeyEvent::new("z").meta(), false);
    assert_eq!(editor.range(), Some(TrimRange::new(0.0, 100.0)));

    editor.handle_key(&KeyEvent::new("y").ctrl(), false);
    assert_eq!(editor.range(), Some(TrimRange::new(0.0, 80.0)));
}

#[test]
fn test_drag_reverts_ui_on_cancel() {
    let mut h = default_harness();
    h.editor.handle_pointer(PointerEvent::Down { x: 1000.0 });
    assert_eq!(h.ui.cursor(), CursorStyle::ResizeHorizontal);
    assert_eq!(h.ui.active_listeners(ListenerScope::DragTracking), 1);

    h.editor.handle_pointer(PointerEvent::Cancel);
    assert_eq!(h.ui.cursor(), CursorStyle::Default);
    assert!(h.ui.text_selection_enabled());
    assert_eq!(h.ui.active_listeners(ListenerScope::DragTracking), 0);
}

#[test]
fn test_click_on_track_seeks_inside_range() {
    let mut h = default_harness();
    h.editor.set_range(20.0, 60.0);

    let outcome = h.editor.handle_pointer(PointerEvent::Down { x: 700.0 });
    assert_eq!(outcome, DragOutcome::Seek(60.0));
    assert_eq!(h.playback.current_time(), 60.0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_playback_auto_pauses_at_range_end() {
    let mut h = default_harness();
    h.editor.set_range(10.0, 12.0);
    assert!(h.editor.toggle_play().await.unwrap());
    assert_eq!(h.playback.current_time(), 10.0);

    tokio::time::advance(Duration::from_millis(2500)).await;
    assert_eq!(h.editor.on_time_update(), Some(12.0));
    assert!(!h.playback.is_playing());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_full_range_export_returns_original_blob() {
    let h = default_harness();
    let outcome = h.editor.export().await.unwrap();

    assert!(outcome.blob().unwrap().same_blob(&h.source));
    assert_eq!(h.canvas.acquired.load(Ordering::SeqCst), 0);
    assert_eq!(h.editor.export_state(), ExportState::Complete);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_sub_range_export_matches_range_duration() {
    let mut h = harness(Options {
        seconds: 10.0,
        ..Options::default()
    });
    h.editor.set_range(2.0, 5.5);
    let outcome = h.editor.export().await.unwrap();
    let blob = outcome.into_blob().unwrap();
    assert!(!blob.same_blob(&h.source));

    let video = RawVideo::parse(blob).unwrap();
    let frame = 1.0 / video.header().fps as f64;
    assert_eq!(video.header().fps, h.editor.config().export_fps);
    assert!(video.duration() >= 3.5 - 1e-9);
    assert!(video.duration() < 3.5 + frame);

    // First exported frame shows the source at the range start.
    assert_eq!(stamped_index(video.frame_pixels(0).unwrap()), Some(20));
    let last = stamped_index(video.frame_pixels(video.frame_count() - 1).unwrap()).unwrap();
    assert!((50..55).contains(&last), "last frame {}", last);
    assert_eq!(h.editor.export_state(), ExportState::Complete);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_concurrent_export_is_rejected() {
    let mut h = harness(Options {
        seconds: 10.0,
        ..Options::default()
    });
    h.editor.set_range(1.0, 2.0);

    let (first, second) = tokio::join!(h.editor.export(), h.editor.export());
    assert!(matches!(first, Ok(ExportOutcome::Complete(_))));
    assert!(matches!(second, Err(DomainError::ExportInProgress)));

    // Once the first export has finished a new one may start.
    assert!(matches!(h.editor.export().await, Ok(ExportOutcome::Complete(_))));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_stalled_seek_times_out() {
    let config = EditorConfig {
        seek_timeout_ms: 250,
        ..EditorConfig::default()
    };
    let mut h = harness(Options {
        seconds: 10.0,
        config,
        stalled_seeks: true,
        ..Options::default()
    });
    h.editor.set_range(3.0, 6.0);

    let started = tokio::time::Instant::now();
    let outcome = h.editor.export().await.unwrap();
    assert_eq!(
        outcome,
        ExportOutcome::Failed {
            message: EXPORT_FAILED_MESSAGE.to_string()
        }
    );
    assert!(started.elapsed() >= Duration::from_millis(250));
    assert_eq!(h.editor.export_state(), ExportState::Failed);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_canvas_failure_fails_export() {
    let mut h = harness(Options {
        seconds: 10.0,
        refuse_canvas: true,
        ..Options::default()
    });
    h.editor.set_range(3.0, 6.0);

    let outcome = h.editor.export().await.unwrap();
    assert_eq!(outcome.state(), ExportState::Failed);
    assert!(outcome.blob().is_none());
    assert_eq!(h.canvas.acquired.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_encoder_failure_yields_no_partial_blob() {
    let mut h = harness(Options {
        seconds: 10.0,
        encoder: Some(Arc::new(BrokenEncoder { fail_after: 5 })),
        ..Options::default()
    });
    h.editor.set_range(3.0, 6.0);

    let outcome = h.editor.export().await.unwrap();
    assert_eq!(
        outcome,
        ExportOutcome::Failed {
            message: "Export failed, please try again.".to_string()
        }
    );
    assert!(!h.playback.is_playing());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_cancel_discards_export() {
    let mut h = harness(Options {
        seconds: 10.0,
        ..Options::default()
    });
    h.editor.set_range(1.0, 9.0);
    let pipeline = h.editor.export_pipeline();

    let cancel = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(pipeline.state(), ExportState::Processing);
        assert!(pipeline.cancel());
    };
    let (outcome, _) = tokio::join!(h.editor.export(), cancel);

    assert_eq!(outcome.unwrap(), ExportOutcome::Cancelled);
    assert_eq!(h.editor.export_state(), ExportState::Cancelled);
    assert!(pipeline.progress().info().frames > 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_close_during_export_cancels_and_restores_playback() {
    let mut h = harness(Options {
        seconds: 10.0,
        ..Options::default()
    });
    h.editor.set_range(1.0, 8.0);
    h.playback.set_current_time(7.0);
    h.editor.playback().set_volume(0.4);
    let before = h.editor.playback().snapshot();

    let export = h.editor.export();
    let close = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(h.editor.export_state(), ExportState::Processing);
        h.editor.close();
    };
    let (outcome, _) = tokio::join!(export, close);

    assert_eq!(outcome.unwrap(), ExportOutcome::Cancelled);
    assert_eq!(h.editor.export_state(), ExportState::Cancelled);
    assert_eq!(h.editor.playback().snapshot(), before);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_dropped_export_leaves_playback_paused_where_it_was() {
    let h = harness(Options {
        seconds: 10.0,
        ..Options::default()
    });
    let mut editor = h.editor;
    editor.set_range(1.0, 8.0);
    h.playback.set_current_time(5.0);
    editor.playback().set_volume(0.5);
    editor.playback().set_rate(2.0);

    let result = tokio::time::timeout(Duration::from_millis(700), editor.export()).await;
    assert!(result.is_err());

    assert_eq!(editor.export_state(), ExportState::Cancelled);
    assert!(!h.playback.is_playing());
    assert_eq!(h.playback.current_time(), 5.0);
    assert_eq!(h.playback.volume(), 0.5);
    assert_eq!(h.playback.playback_rate(), 2.0);

    let outcome = editor.export().await.unwrap();
    assert_eq!(outcome.state(), ExportState::Complete);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_playback_state_restored_after_export() {
    let mut h = harness(Options {
        seconds: 10.0,
        ..Options::default()
    });
    h.editor.set_range(2.0, 4.0);
    h.editor.playback().set_volume(0.3);
    h.editor.playback().set_rate(2.0);
    h.editor.playback().toggle_mute();
    h.playback.set_current_time(7.0);
    let before = h.editor.playback().snapshot();

    let outcome = h.editor.export().await.unwrap();
    assert_eq!(outcome.state(), ExportState::Complete);
    assert_eq!(h.editor.playback().snapshot(), before);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_failed_export_still_restores_playback() {
    let mut h = harness(Options {
        seconds: 10.0,
        encoder: Some(Arc::new(BrokenEncoder { fail_after: 0 })),
        ..Options::default()
    });
    h.editor.set_range(2.0, 4.0);
    h.playback.set_current_time(8.5);
    h.editor.playback().set_volume(0.6);

    let outcome = h.editor.export().await.unwrap();
    assert_eq!(outcome.state(), ExportState::Failed);
    assert_eq!(h.playback.current_time(), 8.5);
    assert_eq!(h.playback.volume(), 0.6);
}

#[test]
fn test_close_releases_listeners() {
    let mut h = default_harness();
    h.editor.handle_pointer(PointerEvent::Down { x: 0.0 });
    h.editor.close();
    assert_eq!(h.ui.active_listeners(ListenerScope::DragTracking), 0);
    assert_eq!(h.ui.cursor(), CursorStyle::Default);

    let ui = Arc::clone(&h.ui);
    drop(h);
    assert_eq!(ui.total_listeners(), 0);
}
