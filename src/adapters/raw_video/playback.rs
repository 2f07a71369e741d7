//! Playback surface and canvas over a raw video blob.
//!
//! The playhead advances with the tokio clock while playing, so tests on a
//! paused runtime see deterministic timing.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::{scale_frame, RawVideo};
use crate::domain::errors::DomainError;
use crate::domain::model::{MediaBlob, VideoFrame};
use crate::ports::*;

#[derive(Debug)]
struct Transport {
    /// Playhead at the moment `playing_since` was taken (or the paused position)
    anchor: f64,
    playing_since: Option<Instant>,
    volume: f64,
    muted: bool,
    rate: f64,
}

#[derive(Debug)]
struct Shared {
    video: RawVideo,
    transport: Mutex<Transport>,
    /// `None` makes every seek hang
    seek_latency: Option<Duration>,
}

impl Shared {
    fn transport(&self) -> MutexGuard<'_, Transport> {
        self.transport.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn duration(&self) -> f64 {
        self.video.duration()
    }

    /// Playhead position, stopping the transport once it runs off the end.
    fn position(&self) -> f64 {
        let duration = self.duration();
        let mut transport = self.transport();
        let Some(since) = transport.playing_since else {
            return transport.anchor;
        };
        let t = transport.anchor + since.elapsed().as_secs_f64() * transport.rate;
        if t >= duration {
            transport.anchor = duration;
            transport.playing_since = None;
            trace!("Playback reached end of media");
            return duration;
        }
        t
    }
}

/// Simulated media element playing a raw video.
#[derive(Debug, Clone)]
pub struct RawVideoPlayback {
    shared: Arc<Shared>,
}

impl RawVideoPlayback {
    pub fn open(blob: MediaBlob) -> Result<Self, DomainError> {
        let video = RawVideo::parse(blob)?;
        debug!(
            width = video.header().width,
            height = video.header().height,
            fps = video.header().fps,
            frames = video.frame_count(),
            "Opened raw video"
        );
        Ok(Self {
            shared: Arc::new(Shared {
                video,
                transport: Mutex::new(Transport {
                    anchor: 0.0,
                    playing_since: None,
                    volume: 1.0,
                    muted: false,
                    rate: 1.0,
                }),
                seek_latency: Some(Duration::from_millis(5)),
            }),
        })
    }

    /// Same clip, but seeks take `latency` to complete
    pub fn with_seek_latency(self, latency: Duration) -> Self {
        self.rebuild(Some(latency))
    }

    /// Same clip, but seeks never complete
    pub fn with_stalled_seeks(self) -> Self {
        self.rebuild(None)
    }

    fn rebuild(self, seek_latency: Option<Duration>) -> Self {
        Self {
            shared: Arc::new(Shared {
                video: self.shared.video.clone(),
                transport: Mutex::new(Transport {
                    anchor: 0.0,
                    playing_since: None,
                    volume: 1.0,
                    muted: false,
                    rate: 1.0,
                }),
                seek_latency,
            }),
        }
    }

    pub fn video(&self) -> &RawVideo {
        &self.shared.video
    }

    fn has_frames(&self) -> bool {
        self.shared.video.frame_count() > 0
    }
}

#[async_trait]
impl PlaybackPort for RawVideoPlayback {
    async fn wait_for_metadata(&self) -> Result<f64, DomainError> {
        if !self.has_frames() {
            return Err(DomainError::InvalidFormat("Video contains no frames".to_string()));
        }
        Ok(self.shared.duration())
    }

    fn duration(&self) -> Option<f64> {
        self.has_frames().then(|| self.shared.duration())
    }

    fn video_size(&self) -> Option<(u32, u32)> {
        let header = self.shared.video.header();
        self.has_frames().then_some((header.width, header.height))
    }

    async fn play(&self) -> Result<(), DomainError> {
        if !self.has_frames() {
            return Err(DomainError::PlaybackFail("No media loaded".to_string()));
        }
        let position = self.shared.position();
        let duration = self.shared.duration();
        let mut transport = self.shared.transport();
        if transport.playing_since.is_some() {
            return Ok(());
        }
        transport.anchor = if position >= duration { 0.0 } else { position };
        transport.playing_since = Some(Instant::now());
        Ok(())
    }

    fn pause(&self) {
        let position = self.shared.position();
        let mut transport = self.shared.transport();
        transport.anchor = position;
        transport.playing_since = None;
    }

    fn is_playing(&self) -> bool {
        // Reading the position stops the transport at end of media.
        self.shared.position();
        self.shared.transport().playing_since.is_some()
    }

    fn current_time(&self) -> f64 {
        self.shared.position()
    }

    fn set_current_time(&self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let target = seconds.clamp(0.0, self.shared.duration());
        let mut transport = self.shared.transport();
        transport.anchor = target;
        if transport.playing_since.is_some() {
            transport.playing_since = Some(Instant::now());
        }
    }

    async fn seek(&self, seconds: f64) -> Result<(), DomainError> {
        if !seconds.is_finite() {
            return Err(DomainError::PlaybackFail(format!("Cannot seek to {}", seconds)));
        }
        self.set_current_time(seconds);
        match self.shared.seek_latency {
            Some(latency) => {
                tokio::time::sleep(latency).await;
                Ok(())
            }
            None => std::future::pending().await,
        }
    }

    fn volume(&self) -> f64 {
        self.shared.transport().volume
    }

    fn set_volume(&self, volume: f64) {
        if volume.is_finite() {
            self.shared.transport().volume = volume.clamp(0.0, 1.0);
        }
    }

    fn muted(&self) -> bool {
        self.shared.transport().muted
    }

    fn set_muted(&self, muted: bool) {
        self.shared.transport().muted = muted;
    }

    fn playback_rate(&self) -> f64 {
        self.shared.transport().rate
    }

    fn set_playback_rate(&self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            return;
        }
        let position = self.shared.position();
        let mut transport = self.shared.transport();
        if transport.playing_since.is_some() {
            transport.anchor = position;
            transport.playing_since = Some(Instant::now());
        }
        transport.rate = rate;
    }
}

/// Canvas context drawing the playback surface's current frame.
struct RawDrawContext {
    shared: Arc<Shared>,
    width: u32,
    height: u32,
}

impl DrawContext for RawDrawContext {
    fn draw_frame(&mut self) -> Result<VideoFrame, DomainError> {
        let video = &self.shared.video;
        let index = video.frame_index_at(self.shared.position());
        let pixels = video
            .frame_pixels(index)
            .ok_or_else(|| DomainError::CaptureFail(format!("Frame {} is not decodable", index)))?;
        let header = video.header();
        scale_frame(pixels, header.width, header.height, self.width, self.height)
    }
}

impl CanvasPort for RawVideoPlayback {
    fn acquire_context(&self, width: u32, height: u32) -> Result<Box<dyn DrawContext>, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::CaptureFail(format!(
                "Cannot create a {}x{} canvas",
                width, height
            )));
        }
        if !self.has_frames() {
            return Err(DomainError::CaptureFail("No media loaded".to_string()));
        }
        Ok(Box::new(RawDrawContext {
            shared: Arc::clone(&self.shared),
            width,
            height,
        }))
    }
}
