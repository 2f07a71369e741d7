use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{HeadlessUi, RawVideoEncoder, RawVideoPlayback, TickerFrameClock, TomlConfigAdapter};
use crate::app::editor_interactor::{EditorPorts, TrimEditor};
use crate::config::EditorConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::{MediaBlob, SourceClip};
use crate::ports::{ConfigPort, EncoderPort, FrameClockPort, UiSurfacePort};

pub trait AppContainer: Send + Sync {
    fn config_port(&self) -> Arc<dyn ConfigPort>;

    /// Wire a playback surface for `blob` to the shared adapters
    fn editor_ports(&self, blob: &MediaBlob) -> Result<EditorPorts, DomainError>;
}

pub struct DefaultAppContainer {
    config_port: Arc<TomlConfigAdapter>,
    ui: Arc<HeadlessUi>,
    encoder: Arc<RawVideoEncoder>,
}

impl DefaultAppContainer {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config_port: Arc::new(TomlConfigAdapter::with_config(config)),
            ui: Arc::new(HeadlessUi::new()),
            encoder: Arc::new(RawVideoEncoder::new()),
        }
    }

    pub fn ui(&self) -> Arc<HeadlessUi> {
        Arc::clone(&self.ui)
    }

    /// Mount an editor on `blob` and wait for its metadata
    pub async fn open_editor(&self, blob: MediaBlob, url: &str) -> Result<TrimEditor, DomainError> {
        let ports = self.editor_ports(&blob)?;
        let config = self.config_port().editor_config().await;
        let mut editor = TrimEditor::mount(SourceClip::new(blob, url), ports, config)?;
        editor.load_metadata().await?;
        Ok(editor)
    }
}

impl AppContainer for DefaultAppContainer {
    fn config_port(&self) -> Arc<dyn ConfigPort> {
        Arc::clone(&self.config_port) as Arc<dyn ConfigPort>
    }

    fn editor_ports(&self, blob: &MediaBlob) -> Result<EditorPorts, DomainError> {
        let playback = Arc::new(RawVideoPlayback::open(blob.clone())?);
        let frame_interval = self
            .config_port
            .config_snapshot()
            .frame_interval_ms;
        Ok(EditorPorts {
            playback: Arc::clone(&playback) as _,
            canvas: playback as _,
            encoder: Arc::clone(&self.encoder) as Arc<dyn EncoderPort>,
            clock: Arc::new(TickerFrameClock::new(Duration::from_millis(frame_interval))) as Arc<dyn FrameClockPort>,
            ui: Arc::clone(&self.ui) as Arc<dyn UiSurfacePort>,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::raw_video::generate_test_pattern;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_open_editor_loads_duration() {
        let container = DefaultAppContainer::new(EditorConfig::default());
        let blob = generate_test_pattern(2, 2, 10, 4.0).unwrap();
        let editor = container.open_editor(blob, "memory://clip").await.unwrap();
        assert_eq!(editor.duration(), Some(4.0));
        assert_eq!(container.ui().active_listeners(crate::ports::ListenerScope::Keyboard), 1);
    }

    #[tokio::test]
    async fn test_open_editor_rejects_garbage() {
        let container = DefaultAppContainer::new(EditorConfig::default());
        let blob = MediaBlob::new(vec![0; 8], "video/webm");
        assert!(container.open_editor(blob, "memory://bad").await.is_err());
    }
}
