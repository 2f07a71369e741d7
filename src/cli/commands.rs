//! Command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::raw_video::{generate_test_pattern, RawVideo};
use crate::app::container::DefaultAppContainer;
use crate::app::editor_interactor::TrimEditor;
use crate::cli::args::{EditArgs, GenerateArgs, InspectArgs, TrimArgs};
use crate::cli::script::{EditScript, StepReport};
use crate::config::EditorConfig;
use crate::domain::model::{MediaBlob, TimeSpec, TrimRange};
use crate::engine::export::ExportOutcome;
use crate::engine::progress::{ConsoleProgressCallback, JsonProgressCallback, ProgressCallback};
use crate::error::ClipTrimError;
use crate::utils::Utils;

/// Summary of a clip, as printed by `inspect`
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub frames: usize,
    pub duration: f64,
    pub size_bytes: usize,
}

/// Result of an export, as printed by `trim` and `edit`
#[derive(Debug, Serialize)]
pub struct ExportReport {
    pub output: String,
    pub start: f64,
    pub end: f64,
    pub expected_duration: f64,
    pub output_duration: f64,
    pub frames: usize,
    pub passthrough: bool,
}

#[derive(Debug, Serialize)]
struct EditReport {
    steps: Vec<StepReport>,
    range: Option<TrimRange>,
    history_len: usize,
    history_cursor: usize,
    export: Option<ExportReport>,
}

fn read_clip(input: &str) -> Result<MediaBlob> {
    if !Path::new(input).exists() {
        return Err(ClipTrimError::InputFileNotFound {
            path: input.to_string(),
        }
        .into());
    }
    let data = std::fs::read(input).with_context(|| format!("Failed to read {}", input))?;
    Ok(MediaBlob::new(data, crate::adapters::raw_video::MIME_TYPE))
}

fn parse_time(value: &str) -> Result<f64> {
    TimeSpec::parse(value)
        .map(|t| t.as_seconds())
        .map_err(|_| ClipTrimError::InvalidTimeFormat { time: value.to_string() }.into())
}

/// Execute the generate command
pub fn generate(args: GenerateArgs) -> Result<()> {
    let blob = generate_test_pattern(args.width, args.height, args.fps, args.duration)
        .context("Failed to build test pattern")?;
    std::fs::write(&args.output, blob.bytes()).with_context(|| format!("Failed to write {}", args.output))?;
    info!(output = %args.output, bytes = blob.len(), "Test pattern written");
    println!(
        "Wrote {} ({}x{} @ {} fps, {:.3}s, {})",
        args.output,
        args.width,
        args.height,
        args.fps,
        args.duration,
        Utils::format_file_size(blob.len() as u64)
    );
    Ok(())
}

/// Execute the inspect command
pub fn inspect(args: InspectArgs) -> Result<()> {
    let blob = read_clip(&args.input)?;
    let size_bytes = blob.len();
    let video = RawVideo::parse(blob).context("Failed to inspect input file")?;
    let header = video.header();
    let report = InspectReport {
        path: args.input.clone(),
        width: header.width,
        height: header.height,
        fps: header.fps,
        frames: video.frame_count(),
        duration: video.duration(),
        size_bytes,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("File:       {}", report.path);
        println!("Resolution: {}x{}", report.width, report.height);
        println!("Frame rate: {} fps", report.fps);
        println!("Frames:     {}", report.frames);
        println!(
            "Duration:   {} ({:.3}s)",
            TimeSpec::from_seconds(report.duration),
            report.duration
        );
        println!("Size:       {}", Utils::format_file_size(report.size_bytes as u64));
    }
    Ok(())
}

/// Run the editor's export and write the result to `output`
async fn export_to(editor: &TrimEditor, output: &str) -> Result<ExportReport> {
    let range = editor
        .range()
        .context("Clip metadata has not loaded")?;
    let outcome = editor.export().await?;

    let blob = match outcome {
        ExportOutcome::Complete(blob) => blob,
        ExportOutcome::Failed { message } => return Err(ClipTrimError::ExportError { message }.into()),
        ExportOutcome::Cancelled => {
            return Err(ClipTrimError::ExportError {
                message: "cancelled".to_string(),
            }
            .into())
        }
    };

    let passthrough = blob.same_blob(&editor.source().blob);
    let video = RawVideo::parse(blob.clone()).context("Export produced an unreadable clip")?;
    std::fs::write(output, blob.bytes()).with_context(|| format!("Failed to write {}", output))?;
    info!(output, bytes = blob.len(), passthrough, "Export written");

    Ok(ExportReport {
        output: output.to_string(),
        start: range.start,
        end: range.end,
        expected_duration: range.span(),
        output_duration: video.duration(),
        frames: video.frame_count(),
        passthrough,
    })
}

fn print_export(report: &ExportReport) {
    println!(
        "Exported {} -> {} ({:.3}s, {} frames{})",
        TrimRange::new(report.start, report.end),
        report.output,
        report.output_duration,
        report.frames,
        if report.passthrough { ", unchanged source" } else { "" }
    );
}

/// Execute the trim command
pub async fn trim(args: TrimArgs, config: EditorConfig) -> Result<()> {
    let blob = read_clip(&args.input)?;
    let container = DefaultAppContainer::new(config);
    let mut editor = container
        .open_editor(blob, &args.input)
        .await
        .context("Failed to open input clip")?;

    if args.start.is_some() || args.end.is_some() {
        let duration = editor.duration().unwrap_or_default();
        let start = args.start.as_deref().map(parse_time).transpose()?.unwrap_or(0.0);
        let end = args.end.as_deref().map(parse_time).transpose()?.unwrap_or(duration);
        if start >= end {
            return Err(anyhow::anyhow!("Start time must be before end time"));
        }
        if end > duration {
            warn!(end, duration, "End time is past the end of the clip, clamping");
        }
        editor.set_range(start, end);
    }
    if args.trim_start {
        editor.quick_trim_start();
    }
    if args.trim_end {
        editor.quick_trim_end();
    }

    if args.progress {
        let callback: Arc<dyn ProgressCallback> = if args.json {
            Arc::new(JsonProgressCallback::new(true))
        } else {
            Arc::new(ConsoleProgressCallback::new(true))
        };
        editor.export_pipeline().progress().add_callback(callback);
    }

    let report = export_to(&editor, &args.output).await?;
    if args.json && args.progress {
        // Progress events are already streaming as NDJSON
        println!("{}", serde_json::to_string(&report)?);
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_export(&report);
    }
    Ok(())
}

/// Execute the edit command
pub async fn edit(args: EditArgs, config: EditorConfig) -> Result<()> {
    let script = EditScript::load(Path::new(&args.script))
        .with_context(|| format!("Failed to load edit script {}", args.script))?;
    let blob = read_clip(&args.input)?;
    let container = DefaultAppContainer::new(config);
    let mut editor = container
        .open_editor(blob, &args.input)
        .await
        .context("Failed to open input clip")?;

    let steps = script.replay(&mut editor);
    let export = match &args.output {
        Some(output) => Some(export_to(&editor, output).await?),
        None => None,
    };

    let report = EditReport {
        steps,
        range: editor.range(),
        history_len: editor.history().len(),
        history_cursor: editor.history().cursor(),
        export,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for step in &report.steps {
        match step.range {
            Some(range) => println!("{:>3}. {:<24} {}", step.index + 1, step.action, range),
            None => println!("{:>3}. {}", step.index + 1, step.action),
        }
    }
    if let Some(range) = report.range {
        println!("Final range: {}", range);
    }
    if let Some(export) = &report.export {
        print_export(export);
    }
    Ok(())
}
