//! Export engine: the capture loop and its progress reporting

pub mod export;
pub mod progress;

pub use export::{
    ExportOutcome, ExportPipeline, ExportPorts, ExportRequest, ExportSettings, EXPORT_FAILED_MESSAGE,
};
pub use progress::{ProgressCallback, ProgressInfo, ProgressPhase, ProgressTracker};
