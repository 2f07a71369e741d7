//! Streaming encoder writing raw video chunks.
//!
//! Frames are placed by presentation time: frame slot `n` covers
//! `[n / fps, (n + 1) / fps)`. Gaps are filled by repeating the previous
//! frame and `finish` pads up to the final timestamp, so the encoded
//! duration lands within one frame interval of the captured span.

use async_trait::async_trait;
use tracing::{debug, trace};

use super::{RawVideoHeader, MIME_TYPE};
use crate::domain::errors::DomainError;
use crate::domain::model::VideoFrame;
use crate::ports::{EncoderPort, EncoderSettings, EncoderSink};

const SLOT_EPSILON: f64 = 1e-9;

/// Encoder factory for the raw video format.
#[derive(Debug, Clone, Default)]
pub struct RawVideoEncoder;

impl RawVideoEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl EncoderPort for RawVideoEncoder {
    fn start(&self, settings: &EncoderSettings) -> Result<Box<dyn EncoderSink>, DomainError> {
        let header = RawVideoHeader::new(settings.width, settings.height, settings.fps)
            .map_err(|e| DomainError::EncoderFail(e.to_string()))?;
        debug!(?settings, "Encoder session started");
        Ok(Box::new(RawVideoSink {
            header,
            chunks: vec![header.encode()],
            last_frame: None,
            written: 0,
        }))
    }
}

struct RawVideoSink {
    header: RawVideoHeader,
    chunks: Vec<Vec<u8>>,
    last_frame: Option<Vec<u8>>,
    written: u64,
}

impl RawVideoSink {
    fn slot(&self, pts: f64) -> u64 {
        (pts.max(0.0) * self.header.fps as f64 + SLOT_EPSILON).floor() as u64
    }

    fn pad_to(&mut self, slot: u64) {
        let Some(last) = self.last_frame.as_ref() else {
            return;
        };
        while self.written < slot {
            self.chunks.push(last.clone());
            self.written += 1;
        }
    }
}

#[async_trait]
impl EncoderSink for RawVideoSink {
    fn mime_type(&self) -> &str {
        MIME_TYPE
    }

    async fn feed(&mut self, frame: VideoFrame, pts: f64) -> Result<(), DomainError> {
        if frame.width != self.header.width || frame.height != self.header.height {
            return Err(DomainError::EncoderFail(format!(
                "Frame is {}x{}, session expects {}x{}",
                frame.width, frame.height, self.header.width, self.header.height
            )));
        }
        if !pts.is_finite() {
            return Err(DomainError::EncoderFail(format!("Invalid presentation time {}", pts)));
        }

        let slot = self.slot(pts);
        if self.last_frame.is_none() {
            // Leading gap is filled with the first frame seen.
            self.last_frame = Some(frame.pixels.clone());
        }
        self.pad_to(slot);
        if self.written == slot {
            self.chunks.push(frame.pixels.clone());
            self.written += 1;
        }
        trace!(pts, slot, written = self.written, "Frame fed");
        self.last_frame = Some(frame.pixels);
        Ok(())
    }

    async fn finish(&mut self, final_pts: f64) -> Result<Vec<Vec<u8>>, DomainError> {
        if self.last_frame.is_none() {
            return Err(DomainError::EncoderFail("No frames were captured".to_string()));
        }
        let fps = self.header.fps as f64;
        let total = ((final_pts.max(0.0) * fps - SLOT_EPSILON).ceil() as u64).max(1);
        self.pad_to(total);
        debug!(frames = self.written, final_pts, "Encoder session finished");
        Ok(std::mem::take(&mut self.chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::raw_video::{stamped_index, RawVideo};
    use crate::domain::model::MediaBlob;

    fn frame(index: u32) -> VideoFrame {
        let mut pixels = vec![0u8; 2 * 2 * 4];
        pixels[0] = index as u8;
        VideoFrame::new(2, 2, pixels).unwrap()
    }

    fn settings() -> EncoderSettings {
        EncoderSettings {
            width: 2,
            height: 2,
            fps: 10,
        }
    }

    fn decode(chunks: Vec<Vec<u8>>) -> RawVideo {
        RawVideo::parse(MediaBlob::from_chunks(chunks, MIME_TYPE)).unwrap()
    }

    #[tokio::test]
    async fn test_frames_are_slotted_by_time() {
        let mut sink = RawVideoEncoder::new().start(&settings()).unwrap();
        sink.feed(frame(1), 0.0).await.unwrap();
        sink.feed(frame(2), 0.31).await.unwrap();
        sink.feed(frame(3), 0.33).await.unwrap();
        let video = decode(sink.finish(0.5).await.unwrap());

        assert_eq!(video.frame_count(), 5);
        let stamps: Vec<_> = (0..5).map(|i| stamped_index(video.frame_pixels(i).unwrap())).collect();
        assert_eq!(stamps, vec![Some(1), Some(1), Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_duration_within_one_frame_of_final_pts() {
        for final_pts in [0.05, 1.0, 2.34, 3.999] {
            let mut sink = RawVideoEncoder::new().start(&settings()).unwrap();
            sink.feed(frame(0), 0.0).await.unwrap();
            let video = decode(sink.finish(final_pts).await.unwrap());
            let duration = video.duration();
            assert!(duration >= final_pts - 1e-9, "{} < {}", duration, final_pts);
            assert!(duration < final_pts + 0.1, "{} too long for {}", duration, final_pts);
        }
    }

    #[tokio::test]
    async fn test_rejects_mismatched_frame() {
        let mut sink = RawVideoEncoder::new().start(&settings()).unwrap();
        let wrong = VideoFrame::new(1, 1, vec![0; 4]).unwrap();
        assert!(matches!(sink.feed(wrong, 0.0).await, Err(DomainError::EncoderFail(_))));
    }

    #[tokio::test]
    async fn test_finish_without_frames_fails() {
        let mut sink = RawVideoEncoder::new().start(&settings()).unwrap();
        assert!(matches!(sink.finish(1.0).await, Err(DomainError::EncoderFail(_))));
    }

    #[test]
    fn test_zero_fps_session_is_refused() {
        let settings = EncoderSettings { fps: 0, ..settings() };
        assert!(RawVideoEncoder::new().start(&settings).is_err());
    }
}
