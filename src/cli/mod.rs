//! CLI module for ClipTrim
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;
pub mod script;

/// ClipTrim video trimmer
///
/// Trims raw video clips the way the interactive editor does: drag handles,
/// quick-trims and undo/redo, followed by a frame-accurate export.
#[derive(Parser, Debug)]
#[command(name = "cliptrim")]
#[command(about = "ClipTrim - Trim and export video clips")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CLIPTRIM_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Logging format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a test-pattern clip
    Generate(args::GenerateArgs),
    /// Inspect video file information
    Inspect(args::InspectArgs),
    /// Trim a clip and export the result
    Trim(args::TrimArgs),
    /// Replay an edit script against a clip
    Edit(args::EditArgs),
}
