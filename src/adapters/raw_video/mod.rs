//! Raw RGBA video container used by the in-process playback and encoder
//! adapters.
//!
//! Layout: a 16-byte header (`CTRV` magic, then width, height and fps as
//! little-endian u32) followed by tightly packed RGBA8 frames.

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaBlob, VideoFrame};

pub mod encoder;
pub mod playback;

pub use encoder::RawVideoEncoder;
pub use playback::RawVideoPlayback;

pub const MAGIC: &[u8; 4] = b"CTRV";
pub const HEADER_LEN: usize = 16;
pub const MIME_TYPE: &str = "video/x-ctrv";
/// Largest width or height a header may declare
pub const MAX_DIMENSION: u32 = 16_384;

/// Stream parameters stored in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawVideoHeader {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl RawVideoHeader {
    pub fn new(width: u32, height: u32, fps: u32) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::InvalidFormat("Video dimensions cannot be zero".to_string()));
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION || VideoFrame::byte_len(width, height).is_none() {
            return Err(DomainError::InvalidFormat(format!(
                "Video dimensions {}x{} exceed the {} pixel limit",
                width, height, MAX_DIMENSION
            )));
        }
        if fps == 0 {
            return Err(DomainError::InvalidFormat("Frame rate must be positive".to_string()));
        }
        Ok(Self { width, height, fps })
    }

    /// Bytes per frame. Bounded by [`MAX_DIMENSION`] at construction.
    pub fn frame_len(&self) -> usize {
        VideoFrame::byte_len(self.width, self.height).unwrap_or(usize::MAX)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.fps.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DomainError> {
        if bytes.len() < HEADER_LEN {
            return Err(DomainError::InvalidFormat(format!(
                "Input is {} bytes, too short for a raw video header",
                bytes.len()
            )));
        }
        if &bytes[0..4] != MAGIC {
            return Err(DomainError::InvalidFormat("Missing CTRV magic".to_string()));
        }
        let field = |offset: usize| {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&bytes[offset..offset + 4]);
            u32::from_le_bytes(raw)
        };
        Self::new(field(4), field(8), field(12))
    }
}

/// Parsed view over a raw video blob
#[derive(Debug, Clone)]
pub struct RawVideo {
    header: RawVideoHeader,
    blob: MediaBlob,
    frame_count: usize,
}

impl RawVideo {
    pub fn parse(blob: MediaBlob) -> Result<Self, DomainError> {
        let header = RawVideoHeader::decode(blob.bytes())?;
        let payload = blob.len() - HEADER_LEN;
        if payload % header.frame_len() != 0 {
            return Err(DomainError::InvalidFormat(format!(
                "Payload of {} bytes is not a whole number of {}x{} frames",
                payload, header.width, header.height
            )));
        }
        let frame_count = payload / header.frame_len();
        Ok(Self {
            header,
            blob,
            frame_count,
        })
    }

    pub fn header(&self) -> RawVideoHeader {
        self.header
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn duration(&self) -> f64 {
        self.frame_count as f64 / self.header.fps as f64
    }

    /// Pixels of frame `index`
    pub fn frame_pixels(&self, index: usize) -> Option<&[u8]> {
        if index >= self.frame_count {
            return None;
        }
        let len = self.header.frame_len();
        let offset = HEADER_LEN + index * len;
        Some(&self.blob.bytes()[offset..offset + len])
    }

    /// Index of the frame shown at `seconds`
    pub fn frame_index_at(&self, seconds: f64) -> usize {
        let index = (seconds.max(0.0) * self.header.fps as f64 + 1e-9).floor() as usize;
        index.min(self.frame_count.saturating_sub(1))
    }
}

/// Frame number stamped into the first pixel of a test-pattern frame
pub fn stamped_index(pixels: &[u8]) -> Option<u32> {
    match pixels {
        [r, g, b, ..] => Some(*r as u32 | (*g as u32) << 8 | (*b as u32) << 16),
        _ => None,
    }
}

/// Build a test-pattern clip: a horizontal gradient with the frame number
/// stamped into the first pixel.
pub fn generate_test_pattern(width: u32, height: u32, fps: u32, seconds: f64) -> Result<MediaBlob, DomainError> {
    let header = RawVideoHeader::new(width, height, fps)?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(DomainError::BadArgs("Clip length must be positive".to_string()));
    }
    let frames = (seconds * fps as f64).round().max(1.0) as usize;
    let payload = frames
        .checked_mul(header.frame_len())
        .and_then(|len| len.checked_add(HEADER_LEN))
        .filter(|len| *len <= isize::MAX as usize)
        .ok_or_else(|| {
            DomainError::BadArgs(format!(
                "{} frames of {}x{} do not fit in memory",
                frames, width, height
            ))
        })?;
    let mut data = header.encode();
    data.reserve(payload - HEADER_LEN);

    for index in 0..frames {
        let shade = (index % 256) as u8;
        for y in 0..height {
            for x in 0..width {
                if x == 0 && y == 0 {
                    let stamp = index as u32;
                    data.extend_from_slice(&[stamp as u8, (stamp >> 8) as u8, (stamp >> 16) as u8, 255]);
                    continue;
                }
                let gradient = (x as u64 * 255 / width.max(1) as u64) as u8;
                data.extend_from_slice(&[gradient, shade, (y % 256) as u8, 255]);
            }
        }
    }
    Ok(MediaBlob::new(data, MIME_TYPE))
}

/// Nearest-neighbour resample of an RGBA frame
pub fn scale_frame(src: &[u8], src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Result<VideoFrame, DomainError> {
    if src_w == dst_w && src_h == dst_h {
        return VideoFrame::new(dst_w, dst_h, src.to_vec());
    }
    let len = VideoFrame::byte_len(dst_w, dst_h)
        .ok_or_else(|| DomainError::CaptureFail(format!("{}x{} frame is too large", dst_w, dst_h)))?;
    let mut pixels = Vec::with_capacity(len);
    for y in 0..dst_h {
        let sy = (y as u64 * src_h as u64 / dst_h as u64) as usize;
        for x in 0..dst_w {
            let sx = (x as u64 * src_w as u64 / dst_w as u64) as usize;
            let offset = (sy * src_w as usize + sx) * 4;
            pixels.extend_from_slice(&src[offset..offset + 4]);
        }
    }
    VideoFrame::new(dst_w, dst_h, pixels)
}
