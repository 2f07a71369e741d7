//! Edit scripts: recorded editor interactions replayed by the `edit` command.
//!
//! ```yaml
//! track: { left: 0, width: 1000 }
//! steps:
//!   - pointer: { type: down, x: 1000 }
//!   - pointer: { type: move, x: 400 }
//!   - pointer: { type: up }
//!   - remove_from_start: 10
//!   - undo
//!   - key: { key: z, ctrl: true, shift: true }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::drag_controller::{DragOutcome, PointerEvent};
use crate::app::editor_interactor::TrimEditor;
use crate::app::shortcuts::KeyEvent;
use crate::domain::model::{TrackGeometry, TrimHandle, TrimRange};
use crate::error::{ClipTrimError, ClipTrimResult};

/// Key press plus where focus was when it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyStep {
    #[serde(flatten)]
    pub event: KeyEvent,
    #[serde(default)]
    pub in_text_input: bool,
}

/// One recorded interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditStep {
    Pointer(PointerEvent),
    Key(KeyStep),
    /// Quick-trim the configured step off one side
    QuickTrim(TrimHandle),
    RemoveFromStart(f64),
    RemoveFromEnd(f64),
    SetRange { start: f64, end: f64 },
    Zoom(f64),
    Reset,
    Undo,
    Redo,
}

/// A full script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    /// Track placement the pointer coordinates refer to
    #[serde(default)]
    pub track: Option<TrackGeometry>,
    #[serde(default)]
    pub zoom: Option<f64>,
    #[serde(default)]
    pub steps: Vec<EditStep>,
}

/// Result of replaying one step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: String,
    pub range: Option<TrimRange>,
}

impl EditScript {
    /// Read a script, choosing TOML or YAML by file extension
    pub fn load(path: &Path) -> ClipTrimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn from_yaml(content: &str) -> ClipTrimResult<Self> {
        serde_yaml::from_str(content).map_err(|e| ClipTrimError::ScriptError {
            message: e.to_string(),
        })
    }

    pub fn from_toml(content: &str) -> ClipTrimResult<Self> {
        toml::from_str(content).map_err(|e| ClipTrimError::ScriptError {
            message: e.to_string(),
        })
    }

    /// Apply every step to `editor` in order
    pub fn replay(&self, editor: &mut TrimEditor) -> Vec<StepReport> {
        if let Some(track) = self.track {
            editor.set_track(track);
        }
        if let Some(zoom) = self.zoom {
            editor.set_zoom(zoom);
        }

        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let action = apply_step(editor, step);
                debug!(index, %action, range = ?editor.range(), "Replayed step");
                StepReport {
                    index,
                    action,
                    range: editor.range(),
                }
            })
            .collect()
    }
}

fn apply_step(editor: &mut TrimEditor, step: &EditStep) -> String {
    match step {
        EditStep::Pointer(event) => match editor.handle_pointer(*event) {
            DragOutcome::Ignored => "ignored".to_string(),
            DragOutcome::Started(handle) => format!("drag {:?} started", handle).to_lowercase(),
            DragOutcome::Moved { handle, time } => format!("{:?} -> {:.3}", handle, time).to_lowercase(),
            DragOutcome::Discarded => "discarded".to_string(),
            DragOutcome::Ended(handle) => format!("drag {:?} ended", handle).to_lowercase(),
            DragOutcome::Seek(time) => format!("seek {:.3}", time),
        },
        EditStep::Key(key) => match editor.handle_key(&key.event, key.in_text_input) {
            Some(action) => format!("{:?}", action).to_lowercase(),
            None => "ignored".to_string(),
        },
        EditStep::QuickTrim(TrimHandle::Start) => applied("quick trim start", editor.quick_trim_start()),
        EditStep::QuickTrim(TrimHandle::End) => applied("quick trim end", editor.quick_trim_end()),
        EditStep::RemoveFromStart(seconds) => applied("remove from start", editor.remove_from_start(*seconds)),
        EditStep::RemoveFromEnd(seconds) => applied("remove from end", editor.remove_from_end(*seconds)),
        EditStep::SetRange { start, end } => applied("set range", editor.set_range(*start, *end)),
        EditStep::Zoom(zoom) => {
            editor.set_zoom(*zoom);
            format!("zoom {}", editor.zoom())
        }
        EditStep::Reset => applied("reset", editor.reset()),
        EditStep::Undo => applied("undo", editor.undo()),
        EditStep::Redo => applied("redo", editor.redo()),
    }
}

fn applied(label: &str, result: Option<TrimRange>) -> String {
    match result {
        Some(_) => label.to_string(),
        None => format!("{} (no-op)", label),
    }
}
