//! ClipTrim CLI
//!
//! Trims raw video clips with the same editing core the interactive editor
//! uses, then exports the selected range frame by frame.
//!
//! # Usage
//!
//! ```bash
//! cliptrim generate -o clip.ctrv --duration 30
//! cliptrim inspect -i clip.ctrv --json
//! cliptrim trim -i clip.ctrv -o out.ctrv --start 00:05 --end 00:12.5
//! cliptrim edit -i clip.ctrv --script steps.yaml -o out.ctrv
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cliptrim::cli::{commands, Cli, Commands};
use cliptrim::config_initialization::initialize_configuration_hierarchy;
use cliptrim::utils::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};

/// Main entry point for the ClipTrim CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = initialize_configuration_hierarchy(&cli).await?;

    let logging = LoggingConfig::new(LogLevel::parse(&config.log_level)?, LogFormat::parse(&config.log_format)?);
    init_logging(&logging);
    info!("Starting ClipTrim");

    match cli.command {
        Commands::Generate(args) => commands::generate(args)?,
        Commands::Inspect(args) => commands::inspect(args)?,
        Commands::Trim(args) => commands::trim(args, config).await?,
        Commands::Edit(args) => commands::edit(args, config).await?,
    }

    info!("ClipTrim completed successfully");
    Ok(())
}
