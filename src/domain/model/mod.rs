// Domain models - Core types and data structures

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Smallest span a trim range may be narrowed to, in seconds.
pub const MINIMUM_SPAN: f64 = 0.5;

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse time string in various formats
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() {
                return Err(DomainError::BadArgs("Time must be finite".to_string()));
            }
            if seconds < 0.0 {
                return Err(DomainError::BadArgs("Time cannot be negative".to_string()));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.as_slice() {
            [minutes, seconds] => {
                let minutes = minutes
                    .parse::<u32>()
                    .map_err(|_| DomainError::BadArgs("Invalid minutes format".to_string()))?;
                let seconds = Self::parse_seconds_part(seconds)?;
                Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
            }
            [hours, minutes, seconds] => {
                let hours = hours
                    .parse::<u32>()
                    .map_err(|_| DomainError::BadArgs("Invalid hours format".to_string()))?;
                let minutes = minutes
                    .parse::<u32>()
                    .map_err(|_| DomainError::BadArgs("Invalid minutes format".to_string()))?;
                if minutes >= 60 {
                    return Err(DomainError::BadArgs("Minutes must be less than 60".to_string()));
                }
                let seconds = Self::parse_seconds_part(seconds)?;
                Ok(Self::from_seconds(
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
                ))
            }
            _ => Err(DomainError::BadArgs(
                "Invalid time format. Supported formats: seconds (e.g., 12.5), MM:SS.ms (e.g., 2:30.5), HH:MM:SS.ms (e.g., 1:02:30.5)".to_string(),
            )),
        }
    }

    fn parse_seconds_part(part: &str) -> Result<f64, DomainError> {
        let seconds = part
            .parse::<f64>()
            .map_err(|_| DomainError::BadArgs("Invalid seconds format".to_string()))?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(DomainError::BadArgs("Seconds must be less than 60".to_string()));
        }
        Ok(seconds)
    }

    /// Format as [H:]MM:SS.mmm
    pub fn format_hms(&self) -> String {
        let total_ms = (self.seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// The `[start, end]` interval of the source clip kept in the export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start: f64,
    pub end: f64,
}

impl TrimRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Range covering the whole clip.
    pub fn full(duration: f64) -> Self {
        Self {
            start: 0.0,
            end: duration,
        }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// True when the range keeps the whole clip, i.e. no trim was requested.
    pub fn is_full(&self, duration: f64) -> bool {
        self.start == 0.0 && self.end == duration
    }

    /// Clamp a playhead position into the range.
    pub fn clamp_time(&self, t: f64) -> f64 {
        t.clamp(self.start, self.end)
    }
}

impl fmt::Display for TrimRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} - {}]",
            TimeSpec::from_seconds(self.start),
            TimeSpec::from_seconds(self.end)
        )
    }
}

/// Snapshot of a trim range kept on the undo/redo stack.
pub type HistoryEntry = TrimRange;

/// Which boundary of the trim range a handle is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimHandle {
    Start,
    End,
}

/// Observable state of the playback surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current_time: f64,
    pub is_playing: bool,
    pub volume: f64,
    pub is_muted: bool,
    pub playback_rate: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            is_playing: false,
            volume: 1.0,
            is_muted: false,
            playback_rate: 1.0,
        }
    }
}

/// Horizontal placement of the timeline track, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    pub left: f64,
    pub width: f64,
}

impl TrackGeometry {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }
}

/// Portion of the clip currently mapped onto the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineViewport {
    pub visible_start: f64,
    pub visible_end: f64,
}

impl TimelineViewport {
    /// Derive the visible window from the trim range, the clip duration and a
    /// zoom factor. Zoom 0 shows the whole clip; growing zoom converges on the
    /// range itself. Negative zoom is treated as 0.
    pub fn derive(range: &TrimRange, duration: f64, zoom: f64) -> Self {
        let zoom = if zoom.is_finite() { zoom.max(0.0) } else { 0.0 };
        let shrink = 1.0 / (1.0 + zoom);
        Self {
            visible_start: range.start - range.start * shrink,
            visible_end: range.end + (duration - range.end) * shrink,
        }
    }

    pub fn span(&self) -> f64 {
        self.visible_end - self.visible_start
    }

    /// Map a pixel position on the track to a time. The result may be
    /// non-finite when the track has no width.
    pub fn x_to_time(&self, x: f64, track: &TrackGeometry) -> f64 {
        let ratio = (x - track.left) / track.width;
        self.visible_start + ratio * self.span()
    }

    /// Map a time to its pixel position on the track.
    pub fn time_to_x(&self, t: f64, track: &TrackGeometry) -> f64 {
        track.left + (t - self.visible_start) / self.span() * track.width
    }
}

/// Immutable media payload. Clones share the same allocation so the
/// no-trim export path can hand back the caller's blob untouched.
#[derive(Debug, Clone)]
pub struct MediaBlob {
    data: Arc<[u8]>,
    mime_type: String,
}

impl MediaBlob {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data: Arc::from(data),
            mime_type: mime_type.into(),
        }
    }

    /// Concatenate encoder chunks into a single blob.
    pub fn from_chunks(chunks: Vec<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self::new(chunks.concat(), mime_type)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Whether both handles point at the same underlying allocation.
    pub fn same_blob(&self, other: &MediaBlob) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl PartialEq for MediaBlob {
    fn eq(&self, other: &Self) -> bool {
        self.mime_type == other.mime_type && self.data == other.data
    }
}

/// Source handed to the editor on mount.
#[derive(Debug, Clone)]
pub struct SourceClip {
    pub blob: MediaBlob,
    /// Render-ready URL the playback surface loads.
    pub url: String,
}

impl SourceClip {
    pub fn new(blob: MediaBlob, url: impl Into<String>) -> Self {
        Self {
            blob,
            url: url.into(),
        }
    }
}

/// One frame drawn to the off-screen canvas, RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl VideoFrame {
    /// Bytes needed for a `width` x `height` RGBA8 frame, `None` on overflow.
    pub fn byte_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)
            .filter(|len| *len <= isize::MAX as usize)
    }

    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DomainError> {
        let expected = Self::byte_len(width, height).ok_or_else(|| {
            DomainError::CaptureFail(format!("{}x{} frame is too large", width, height))
        })?;
        if pixels.len() != expected {
            return Err(DomainError::CaptureFail(format!(
                "frame buffer holds {} bytes, expected {} for {}x{}",
                pixels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Export state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportState {
    Idle,
    Processing,
    Complete,
    Failed,
    Cancelled,
}
