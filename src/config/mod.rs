//! Editor configuration values and their validation

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::history::DEFAULT_HISTORY_LIMIT;
use crate::domain::model::MINIMUM_SPAN;

/// Keyboard combos bound to history navigation, e.g. `"mod+z"`.
///
/// `mod` matches either Ctrl or Cmd.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub undo: Vec<String>,
    pub redo: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            undo: vec!["mod+z".to_string()],
            redo: vec!["mod+shift+z".to_string(), "ctrl+y".to_string()],
        }
    }
}

/// Settings for one editing session and its export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Smallest allowed trim span in seconds
    pub minimum_span: f64,
    /// Seconds removed by the quick-trim actions
    pub quick_trim_seconds: f64,
    /// Maximum number of undo snapshots
    pub history_limit: usize,
    /// Half-width of each handle's pointer hot-zone in pixels
    pub handle_hot_zone_px: f64,
    /// Initial timeline zoom
    pub zoom: f64,
    /// Frame rate the export is encoded at
    pub export_fps: u32,
    /// How long to wait for the export seek before failing
    pub seek_timeout_ms: u64,
    /// Animation frame interval used by the capture loop
    pub frame_interval_ms: u64,
    pub keybindings: KeyBindings,
    pub log_level: String,
    pub log_format: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            minimum_span: MINIMUM_SPAN,
            quick_trim_seconds: 10.0,
            history_limit: DEFAULT_HISTORY_LIMIT,
            handle_hot_zone_px: 12.0,
            zoom: 0.0,
            export_fps: 30,
            seek_timeout_ms: 5_000,
            frame_interval_ms: 16,
            keybindings: KeyBindings::default(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl EditorConfig {
    /// Reject values the editor cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.minimum_span.is_finite() || self.minimum_span <= 0.0 {
            return Err(DomainError::BadArgs(format!(
                "minimum_span must be a positive number of seconds, got {}",
                self.minimum_span
            )));
        }
        if !self.quick_trim_seconds.is_finite() || self.quick_trim_seconds <= 0.0 {
            return Err(DomainError::BadArgs(format!(
                "quick_trim_seconds must be positive, got {}",
                self.quick_trim_seconds
            )));
        }
        if self.history_limit < 2 {
            return Err(DomainError::BadArgs(
                "history_limit must keep at least 2 snapshots".to_string(),
            ));
        }
        if !self.handle_hot_zone_px.is_finite() || self.handle_hot_zone_px < 0.0 {
            return Err(DomainError::BadArgs(
                "handle_hot_zone_px cannot be negative".to_string(),
            ));
        }
        if !(1..=240).contains(&self.export_fps) {
            return Err(DomainError::BadArgs(format!(
                "export_fps must be between 1 and 240, got {}",
                self.export_fps
            )));
        }
        if self.seek_timeout_ms == 0 {
            return Err(DomainError::BadArgs("seek_timeout_ms cannot be zero".to_string()));
        }
        if self.frame_interval_ms == 0 {
            return Err(DomainError::BadArgs("frame_interval_ms cannot be zero".to_string()));
        }
        crate::utils::logging::LogLevel::parse(&self.log_level)?;
        crate::utils::logging::LogFormat::parse(&self.log_format)?;
        for combo in self.keybindings.undo.iter().chain(&self.keybindings.redo) {
            crate::app::shortcuts::KeyCombo::parse(combo)?;
        }
        Ok(())
    }
}
