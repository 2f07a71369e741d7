//! Command-line argument definitions

use clap::Args;

fn parse_fps(s: &str) -> Result<u32, String> {
    clap_num::number_range(s, 1, 240)
}

fn parse_dimension(s: &str) -> Result<u32, String> {
    clap_num::number_range(s, 1, 4096)
}

fn parse_seconds(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("{} is not a number", s))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{} must be a positive number of seconds", s))
    }
}

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Output file path
    #[arg(short, long)]
    pub output: String,

    /// Frame width in pixels
    #[arg(long, default_value = "64", value_parser = parse_dimension)]
    pub width: u32,

    /// Frame height in pixels
    #[arg(long, default_value = "36", value_parser = parse_dimension)]
    pub height: u32,

    /// Frames per second
    #[arg(long, default_value = "30", value_parser = parse_fps)]
    pub fps: u32,

    /// Clip length in seconds
    #[arg(short, long, default_value = "10", value_parser = parse_seconds)]
    pub duration: f64,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the trim command
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output file path
    #[arg(short, long)]
    pub output: String,

    /// Start time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long)]
    pub end: Option<String>,

    /// Quick-trim the configured step off the front
    #[arg(long)]
    pub trim_start: bool,

    /// Quick-trim the configured step off the back
    #[arg(long)]
    pub trim_end: bool,

    /// Seconds removed by each quick-trim
    #[arg(long, value_parser = parse_seconds)]
    pub quick_trim_seconds: Option<f64>,

    /// Export frame rate
    #[arg(long, value_parser = parse_fps)]
    pub fps: Option<u32>,

    /// Give up if the initial seek takes longer than this
    #[arg(long)]
    pub seek_timeout_ms: Option<u64>,

    /// Report export progress (a bar on stderr, or NDJSON events with --json)
    #[arg(long)]
    pub progress: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the edit command
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Edit script (.yaml, .yml or .toml)
    #[arg(long)]
    pub script: String,

    /// Export the final range to this path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}
