//! Error handling module for ClipTrim

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for ClipTrim library entry points
#[derive(Error, Debug)]
pub enum ClipTrimError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// Invalid time format
    #[error("Invalid time format: {time}. Expected HH:MM:SS.ms, MM:SS.ms, or seconds")]
    InvalidTimeFormat { time: String },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Edit script could not be parsed
    #[error("Invalid edit script: {message}")]
    ScriptError { message: String },

    /// Export finished in the failed state
    #[error("Export failed: {message}")]
    ExportError { message: String },

    /// Error raised by the domain layer
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for ClipTrim operations
pub type ClipTrimResult<T> = std::result::Result<T, ClipTrimError>;
