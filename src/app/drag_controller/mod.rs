//! Pointer-driven handle dragging.
//!
//! The controller is a two-state machine, Idle and Dragging, advanced by a
//! single transition function. It never mutates the trim range itself: it
//! reports what happened and the editor applies it, so the history push for a
//! new drag always lands before the first bound update.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::app::subscription::Subscription;
use crate::domain::model::*;
use crate::domain::rules::{hit_test_handle, is_on_track, time_at};
use crate::ports::{CursorStyle, ListenerScope, UiSurfacePort};

/// Pointer and touch input delivered to the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { x: f64 },
    Move { x: f64 },
    Up,
    TouchEnd,
    Cancel,
    /// Any event the controller has no rule for
    #[serde(other)]
    Unrecognized,
}

/// Current drag state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        handle: TrimHandle,
        /// Viewport captured at drag start, used for every move of this drag
        viewport: TimelineViewport,
    },
}

/// What a pointer event amounted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// Nothing to apply
    Ignored,
    /// A handle was grabbed; record history before applying any move
    Started(TrimHandle),
    /// Move the given bound to `time`
    Moved { handle: TrimHandle, time: f64 },
    /// Move produced an unusable time; still dragging
    Discarded,
    /// Drag finished
    Ended(TrimHandle),
    /// Click on the track: move the playhead here
    Seek(f64),
}

/// Everything the controller needs to interpret a pointer position.
#[derive(Debug, Clone, Copy)]
pub struct DragContext {
    pub range: TrimRange,
    pub duration: f64,
    pub viewport: TimelineViewport,
    pub track: TrackGeometry,
}

/// Global UI changes held for the length of one drag.
struct DragGuard {
    ui: Arc<dyn UiSurfacePort>,
    _tracking: Subscription,
}

impl DragGuard {
    fn engage(ui: Arc<dyn UiSurfacePort>) -> Self {
        ui.set_cursor(CursorStyle::ResizeHorizontal);
        ui.set_text_selection(false);
        let tracking = Subscription::attach(Arc::clone(&ui), ListenerScope::DragTracking);
        Self {
            ui,
            _tracking: tracking,
        }
    }
}

impl Drop for DragGuard {
    fn drop(&mut self) {
        self.ui.set_cursor(CursorStyle::Default);
        self.ui.set_text_selection(true);
    }
}

/// Handle drag state machine.
pub struct DragController {
    state: DragState,
    hot_zone_px: f64,
    ui: Arc<dyn UiSurfacePort>,
    guard: Option<DragGuard>,
}

impl DragController {
    pub fn new(ui: Arc<dyn UiSurfacePort>, hot_zone_px: f64) -> Self {
        Self {
            state: DragState::Idle,
            hot_zone_px,
            ui,
            guard: None,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Advance the state machine. `ctx` is `None` while the clip duration is
    /// unknown, which makes every event inert apart from ending a drag.
    pub fn handle(&mut self, event: PointerEvent, ctx: Option<&DragContext>) -> DragOutcome {
        trace!(?event, state = ?self.state, "Pointer event");
        match (self.state, event) {
            (DragState::Idle, PointerEvent::Down { x }) => match ctx {
                Some(ctx) => self.pointer_down(x, ctx),
                None => DragOutcome::Ignored,
            },
            (DragState::Idle, PointerEvent::Move { .. }) => DragOutcome::Ignored,
            (DragState::Idle, _) => {
                self.release();
                DragOutcome::Ignored
            }
            (DragState::Dragging { handle, viewport }, PointerEvent::Move { x }) => {
                let Some(ctx) = ctx else {
                    return DragOutcome::Discarded;
                };
                let Some(time) = time_at(&viewport, &ctx.track, x, ctx.duration) else {
                    debug!(x, "Discarding pointer move outside the clip");
                    return DragOutcome::Discarded;
                };
                DragOutcome::Moved { handle, time }
            }
            (DragState::Dragging { .. }, PointerEvent::Down { .. }) => DragOutcome::Ignored,
            (DragState::Dragging { handle, .. }, _) => {
                self.release();
                debug!(?handle, "Drag ended");
                DragOutcome::Ended(handle)
            }
        }
    }

    fn pointer_down(&mut self, x: f64, ctx: &DragContext) -> DragOutcome {
        if let Some(handle) = hit_test_handle(x, &ctx.range, &ctx.viewport, &ctx.track, self.hot_zone_px) {
            self.state = DragState::Dragging {
                handle,
                viewport: ctx.viewport,
            };
            self.guard = Some(DragGuard::engage(Arc::clone(&self.ui)));
            debug!(?handle, x, "Drag started");
            return DragOutcome::Started(handle);
        }

        if !is_on_track(x, &ctx.track) {
            return DragOutcome::Ignored;
        }
        let time = ctx.viewport.x_to_time(x, &ctx.track);
        if !time.is_finite() {
            return DragOutcome::Ignored;
        }
        DragOutcome::Seek(ctx.range.clamp_time(time))
    }

    /// Return to Idle and revert cursor and selection suppression, whatever
    /// state the controller was in.
    pub fn release(&mut self) {
        self.state = DragState::Idle;
        if self.guard.take().is_none() {
            self.ui.set_cursor(CursorStyle::Default);
            self.ui.set_text_selection(true);
        }
    }
}
