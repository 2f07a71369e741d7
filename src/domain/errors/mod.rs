// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),
    /// Media element could not play, pause or seek
    #[error("Playback failed: {0}")]
    PlaybackFail(String),
    /// Off-screen canvas or its drawing context is unavailable
    #[error("Frame capture failed: {0}")]
    CaptureFail(String),
    /// Encoder sink failed to start, accept a frame or stop
    #[error("Encoder failed: {0}")]
    EncoderFail(String),
    /// Seek did not complete in time
    #[error("Seek to {target:.3}s did not complete within {timeout_ms}ms")]
    SeekTimeout { target: f64, timeout_ms: u64 },
    /// Another export is already running on this editor
    #[error("An export is already in progress")]
    ExportInProgress,
    /// Export was cancelled before it completed
    #[error("Export cancelled")]
    Cancelled,
    /// Media blob is not in a supported format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// File system operation failed
    #[error("File system error: {0}")]
    FsFail(String),
}

impl DomainError {
    /// Whether the failure came from the capture side of an export
    /// (canvas, encoder or the positioned frame source).
    pub fn is_capture_error(&self) -> bool {
        matches!(
            self,
            DomainError::PlaybackFail(_)
                | DomainError::CaptureFail(_)
                | DomainError::EncoderFail(_)
                | DomainError::SeekTimeout { .. }
        )
    }
}
