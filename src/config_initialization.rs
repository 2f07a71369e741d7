//! Configuration initialization and hierarchy management

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapters::TomlConfigAdapter;
use crate::cli::{Cli, Commands};
use crate::config::EditorConfig;
use crate::error::{ClipTrimError, ClipTrimResult};
use crate::ports::ConfigPort;

/// Files searched when `--config` is not given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["cliptrim.toml", "config/cliptrim.toml"];

/// Environment variables mapped onto config keys
pub const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("CLIPTRIM_MINIMUM_SPAN", "minimum_span"),
    ("CLIPTRIM_QUICK_TRIM_SECONDS", "quick_trim_seconds"),
    ("CLIPTRIM_HISTORY_LIMIT", "history_limit"),
    ("CLIPTRIM_HANDLE_HOT_ZONE_PX", "handle_hot_zone_px"),
    ("CLIPTRIM_ZOOM", "zoom"),
    ("CLIPTRIM_EXPORT_FPS", "export_fps"),
    ("CLIPTRIM_SEEK_TIMEOUT_MS", "seek_timeout_ms"),
    ("CLIPTRIM_FRAME_INTERVAL_MS", "frame_interval_ms"),
    ("CLIPTRIM_LOG_FORMAT", "log_format"),
];

/// Resolve the editor configuration following precedence: CLI > Env > File > Defaults
pub async fn initialize_configuration_hierarchy(cli: &Cli) -> Result<EditorConfig> {
    let adapter = TomlConfigAdapter::new();

    load_config_file(&adapter, cli.config.as_deref()).await?;
    load_environment_variables(&adapter, std::env::vars()).await?;
    apply_cli_configuration_overrides(&adapter, cli).await?;

    validate_configuration(&adapter)
        .await
        .context("Invalid configuration")?;
    Ok(adapter.editor_config().await)
}

/// Check the merged configuration, reporting problems as [`ClipTrimError::ConfigError`]
pub async fn validate_configuration(adapter: &TomlConfigAdapter) -> ClipTrimResult<()> {
    adapter
        .validate_config()
        .await
        .map_err(|e| ClipTrimError::ConfigError {
            message: e.to_string(),
        })
}

/// Load the explicit config file, or the first default path that exists
async fn load_config_file(adapter: &TomlConfigAdapter, explicit: Option<&str>) -> Result<()> {
    if let Some(path) = explicit {
        adapter
            .load_config(path)
            .await
            .with_context(|| format!("Failed to load config file {}", path))?;
        return Ok(());
    }

    for path in DEFAULT_CONFIG_PATHS {
        if Path::new(path).exists() {
            adapter
                .load_config(path)
                .await
                .with_context(|| format!("Failed to load config file {}", path))?;
            return Ok(());
        }
    }
    debug!("No configuration file found, using defaults");
    Ok(())
}

/// Apply `CLIPTRIM_*` overrides found in `vars`
pub async fn load_environment_variables<I>(adapter: &TomlConfigAdapter, vars: I) -> Result<usize>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env_overrides = 0;
    for (name, value) in vars {
        let Some((_, key)) = ENV_MAPPINGS.iter().find(|(env_var, _)| *env_var == name) else {
            continue;
        };
        adapter
            .set_config(key, &value)
            .await
            .with_context(|| format!("Invalid value in {}", name))?;
        debug!("Environment override: {} = {}", key, value);
        env_overrides += 1;
    }

    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }
    Ok(env_overrides)
}

/// Apply CLI argument overrides to configuration
async fn apply_cli_configuration_overrides(adapter: &TomlConfigAdapter, cli: &Cli) -> Result<()> {
    let mut overrides: Vec<(&str, String)> = Vec::new();

    if let Some(level) = &cli.log_level {
        overrides.push(("log_level", level.clone()));
    }
    if let Some(format) = &cli.log_format {
        overrides.push(("log_format", format.clone()));
    }
    if let Commands::Trim(args) = &cli.command {
        if let Some(fps) = args.fps {
            overrides.push(("export_fps", fps.to_string()));
        }
        if let Some(timeout) = args.seek_timeout_ms {
            overrides.push(("seek_timeout_ms", timeout.to_string()));
        }
        if let Some(seconds) = args.quick_trim_seconds {
            overrides.push(("quick_trim_seconds", seconds.to_string()));
        }
    }

    for (key, value) in &overrides {
        adapter.set_config(key, value).await?;
    }
    if !overrides.is_empty() {
        info!("Applied {} CLI configuration overrides", overrides.len());
    }
    Ok(())
}
