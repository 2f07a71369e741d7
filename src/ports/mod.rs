// Ports - Interface definitions (contracts)

use async_trait::async_trait;

use crate::config::EditorConfig;
use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for the media element driving preview and export.
///
/// Mirrors the capability set of a browser video element: setters are
/// fire-and-forget, `seek` resolves once the new position is decoded.
#[async_trait]
pub trait PlaybackPort: Send + Sync {
    /// Resolve with the decoded duration once metadata has loaded
    async fn wait_for_metadata(&self) -> Result<f64, DomainError>;

    /// Duration in seconds, `None` until metadata has loaded
    fn duration(&self) -> Option<f64>;

    /// Intrinsic video dimensions, `None` until metadata has loaded
    fn video_size(&self) -> Option<(u32, u32)>;

    /// Start playback from the current position
    async fn play(&self) -> Result<(), DomainError>;

    /// Pause playback
    fn pause(&self);

    fn is_playing(&self) -> bool;

    fn current_time(&self) -> f64;

    /// Move the playhead without waiting for the seek to complete
    fn set_current_time(&self, seconds: f64);

    /// Move the playhead and wait until the frame at `seconds` is ready
    async fn seek(&self, seconds: f64) -> Result<(), DomainError>;

    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);

    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);
}

/// Port for the off-screen canvas frames are drawn into during export
pub trait CanvasPort: Send + Sync {
    /// Obtain a 2D drawing context sized for the video
    fn acquire_context(&self, width: u32, height: u32) -> Result<Box<dyn DrawContext>, DomainError>;
}

/// Drawing context owned by one export; released on drop
pub trait DrawContext: Send {
    /// Draw the playback surface's current frame and read it back
    fn draw_frame(&mut self) -> Result<VideoFrame, DomainError>;
}

/// Encoder configuration for one export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Port for the streaming encoder that turns captured frames into media
pub trait EncoderPort: Send + Sync {
    /// Start a capture session at the given frame rate
    fn start(&self, settings: &EncoderSettings) -> Result<Box<dyn EncoderSink>, DomainError>;
}

/// One running encoder session. Dropping it without `finish` discards
/// every chunk produced so far.
#[async_trait]
pub trait EncoderSink: Send {
    /// MIME type of the produced media
    fn mime_type(&self) -> &str;

    /// Feed one frame with its presentation time relative to capture start
    async fn feed(&mut self, frame: VideoFrame, pts: f64) -> Result<(), DomainError>;

    /// Stop encoding and hand back the accumulated output chunks
    async fn finish(&mut self, final_pts: f64) -> Result<Vec<Vec<u8>>, DomainError>;
}

/// Port for animation-frame scheduling
#[async_trait]
pub trait FrameClockPort: Send + Sync {
    /// Resolve on the next animation frame
    async fn next_frame(&self);
}

/// Cursor shown over the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Default,
    ResizeHorizontal,
}

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerScope {
    /// Document-level pointer move/up tracking while a handle is dragged
    DragTracking,
    /// Window-level keyboard shortcuts for the editor lifetime
    Keyboard,
}

/// Identifier of an attached listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Port for global UI side effects the editor may toggle
pub trait UiSurfacePort: Send + Sync {
    fn set_cursor(&self, cursor: CursorStyle);

    fn set_text_selection(&self, enabled: bool);

    fn add_listener(&self, scope: ListenerScope) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);
}

/// Port for configuration management
#[async_trait]
pub trait ConfigPort: Send + Sync {
    /// Get configuration value
    async fn get_config(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Get configuration value with default
    async fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, DomainError>;

    /// Set configuration value
    async fn set_config(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Load configuration from file
    async fn load_config(&self, file_path: &str) -> Result<(), DomainError>;

    /// Save configuration to file
    async fn save_config(&self, file_path: &str) -> Result<(), DomainError>;

    /// Validate configuration
    async fn validate_config(&self) -> Result<(), DomainError>;

    /// Typed snapshot of the current configuration
    async fn editor_config(&self) -> EditorConfig;
}
