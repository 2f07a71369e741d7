//! ClipTrim video trim/export library
//!
//! Core of an in-browser style clip editor: a clamped trim range, handle
//! dragging, undo/redo history and a capture-and-encode export pipeline,
//! all reached through ports so the media collaborators can be swapped.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{DefaultAppContainer, EditorPorts, TrimEditor};
pub use config::EditorConfig;
pub use domain::errors::DomainError;
pub use domain::model::{MediaBlob, SourceClip, TrimRange};
pub use engine::{ExportOutcome, EXPORT_FAILED_MESSAGE};
pub use error::{ClipTrimError, ClipTrimResult};
