// TOML config adapter - Editor configuration backed by TOML files

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::domain::errors::*;
use crate::ports::*;

/// Table the editor settings live under in a config file
pub const CONFIG_SECTION: &str = "cliptrim";

/// TOML configuration adapter
#[derive(Debug, Default)]
pub struct TomlConfigAdapter {
    config: RwLock<EditorConfig>,
    config_file_path: RwLock<Option<PathBuf>>,
}

impl TomlConfigAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config: RwLock::new(config),
            config_file_path: RwLock::new(None),
        }
    }

    /// Path of the last file loaded or saved
    pub fn config_file_path(&self) -> Option<PathBuf> {
        self.config_file_path
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Current values without going through the async port
    pub fn config_snapshot(&self) -> EditorConfig {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, EditorConfig> {
        self.config.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, EditorConfig> {
        self.config.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remember_path(&self, path: PathBuf) {
        *self
            .config_file_path
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(path);
    }

    fn to_table(config: &EditorConfig) -> Result<toml::Table, DomainError> {
        match toml::Value::try_from(config) {
            Ok(toml::Value::Table(table)) => Ok(table),
            Ok(_) => Err(DomainError::BadArgs("Config did not serialize to a table".to_string())),
            Err(e) => Err(DomainError::BadArgs(format!("Failed to serialize config: {}", e))),
        }
    }

    fn from_table(table: toml::Table) -> Result<EditorConfig, DomainError> {
        toml::Value::Table(table)
            .try_into()
            .map_err(|e| DomainError::BadArgs(format!("Invalid config: {}", e)))
    }

    /// Serialize config to TOML string
    fn serialize_config(&self) -> Result<String, DomainError> {
        let mut root = toml::Table::new();
        root.insert(
            CONFIG_SECTION.to_string(),
            toml::Value::Table(Self::to_table(&self.read())?),
        );
        toml::to_string_pretty(&root)
            .map_err(|e| DomainError::BadArgs(format!("Failed to serialize config: {}", e)))
    }

    /// Merge a TOML document over the current values. Settings may sit in a
    /// `[cliptrim]` table or at the top level.
    fn deserialize_config(&self, toml_content: &str) -> Result<(), DomainError> {
        let mut parsed: toml::Table = toml::from_str(toml_content)
            .map_err(|e| DomainError::BadArgs(format!("Failed to parse TOML config: {}", e)))?;

        let overrides = match parsed.remove(CONFIG_SECTION) {
            Some(toml::Value::Table(section)) => section,
            Some(_) => {
                return Err(DomainError::BadArgs(format!(
                    "[{}] must be a table",
                    CONFIG_SECTION
                )))
            }
            None => parsed,
        };

        let mut config = self.write();
        let mut merged = Self::to_table(&config)?;
        merge_tables(&mut merged, overrides);
        *config = Self::from_table(merged)?;
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn lookup<'a>(table: &'a toml::Table, key: &str) -> Option<&'a toml::Value> {
    let mut parts = key.split('.');
    let mut value = table.get(parts.next()?)?;
    for part in parts {
        value = value.as_table()?.get(part)?;
    }
    Some(value)
}

fn lookup_mut<'a>(table: &'a mut toml::Table, key: &str) -> Option<&'a mut toml::Value> {
    let mut parts = key.split('.');
    let mut value = table.get_mut(parts.next()?)?;
    for part in parts {
        value = value.as_table_mut()?.get_mut(part)?;
    }
    Some(value)
}

fn render(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Parse `raw` into the same TOML type as `current`
fn parse_like(current: &toml::Value, key: &str, raw: &str) -> Result<toml::Value, DomainError> {
    let invalid = |kind: &str| DomainError::BadArgs(format!("Invalid {} value for {}: {}", kind, key, raw));
    Ok(match current {
        toml::Value::Integer(_) => toml::Value::Integer(raw.trim().parse().map_err(|_| invalid("integer"))?),
        toml::Value::Float(_) => toml::Value::Float(raw.trim().parse().map_err(|_| invalid("number"))?),
        toml::Value::Boolean(_) => toml::Value::Boolean(raw.trim().parse().map_err(|_| invalid("boolean"))?),
        toml::Value::Array(_) => toml::Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| toml::Value::String(s.to_string()))
                .collect(),
        ),
        toml::Value::Table(_) => {
            return Err(DomainError::BadArgs(format!("{} is a section, set its keys instead", key)))
        }
        _ => toml::Value::String(raw.to_string()),
    })
}

#[async_trait]
impl ConfigPort for TomlConfigAdapter {
    async fn get_config(&self, key: &str) -> Result<Option<String>, DomainError> {
        let table = Self::to_table(&self.read())?;
        Ok(lookup(&table, key).map(render))
    }

    async fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, DomainError> {
        Ok(self
            .get_config(key)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut config = self.write();
        let mut table = Self::to_table(&config)?;
        let slot = lookup_mut(&mut table, key)
            .ok_or_else(|| DomainError::BadArgs(format!("Unknown config key: {}", key)))?;
        *slot = parse_like(slot, key, value)?;
        *config = Self::from_table(table)?;
        debug!("Set config {} = {}", key, value);
        Ok(())
    }

    async fn load_config(&self, file_path: &str) -> Result<(), DomainError> {
        let path = PathBuf::from(file_path);
        if !path.exists() {
            return Err(DomainError::FsFail(format!(
                "Config file does not exist: {}",
                file_path
            )));
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to read config file: {}", e)))?;
        self.deserialize_config(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        self.remember_path(path);
        Ok(())
    }

    async fn save_config(&self, file_path: &str) -> Result<(), DomainError> {
        let path = PathBuf::from(file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::FsFail(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = self.serialize_config()?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to write config file: {}", e)))?;
        self.remember_path(path);
        Ok(())
    }

    async fn validate_config(&self) -> Result<(), DomainError> {
        self.read().validate()
    }

    async fn editor_config(&self) -> EditorConfig {
        self.config_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_and_set_typed_values() {
        let adapter = TomlConfigAdapter::new();
        assert_eq!(adapter.get_config("export_fps").await.unwrap().as_deref(), Some("30"));
        assert_eq!(
            adapter.get_config("keybindings.redo").await.unwrap().as_deref(),
            Some("mod+shift+z,ctrl+y")
        );

        adapter.set_config("minimum_span", "1.5").await.unwrap();
        adapter.set_config("keybindings.undo", "ctrl+z, meta+z").await.unwrap();
        let config = adapter.editor_config().await;
        assert_eq!(config.minimum_span, 1.5);
        assert_eq!(config.keybindings.undo, vec!["ctrl+z", "meta+z"]);

        assert!(adapter.set_config("export_fps", "fast").await.is_err());
        assert!(adapter.set_config("no_such_key", "1").await.is_err());
        assert_eq!(adapter.get_config_or_default("no_such_key", "x").await.unwrap(), "x");
    }

    #[tokio::test]
    async fn test_load_section_or_top_level() {
        let dir = tempfile::tempdir().unwrap();

        let sectioned = dir.path().join("a.toml");
        std::fs::write(&sectioned, "[cliptrim]\nseek_timeout_ms = 250\n").unwrap();
        let adapter = TomlConfigAdapter::new();
        adapter.load_config(sectioned.to_str().unwrap()).await.unwrap();
        assert_eq!(adapter.editor_config().await.seek_timeout_ms, 250);
        assert_eq!(adapter.config_file_path(), Some(sectioned));

        let flat = dir.path().join("b.toml");
        std::fs::write(&flat, "export_fps = 12\n[keybindings]\nredo = [\"ctrl+y\"]\n").unwrap();
        adapter.load_config(flat.to_str().unwrap()).await.unwrap();
        let config = adapter.editor_config().await;
        assert_eq!(config.export_fps, 12);
        assert_eq!(config.seek_timeout_ms, 250);
        assert_eq!(config.keybindings.redo, vec!["ctrl+y"]);
        assert_eq!(config.keybindings.undo, vec!["mod+z"]);
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let adapter = TomlConfigAdapter::new();
        adapter.set_config("quick_trim_seconds", "5").await.unwrap();
        adapter.save_config(path.to_str().unwrap()).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[cliptrim]"));

        let reloaded = TomlConfigAdapter::new();
        reloaded.load_config(path.to_str().unwrap()).await.unwrap();
        assert_eq!(reloaded.editor_config().await.quick_trim_seconds, 5.0);
    }

    #[tokio::test]
    async fn test_missing_file_and_bad_toml() {
        let adapter = TomlConfigAdapter::new();
        assert!(matches!(
            adapter.load_config("/definitely/not/here.toml").await,
            Err(DomainError::FsFail(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "export_fps = \"thirty\"").unwrap();
        assert!(adapter.load_config(path.to_str().unwrap()).await.is_err());
        assert_eq!(adapter.editor_config().await.export_fps, 30);
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_level() {
        let adapter = TomlConfigAdapter::new();
        adapter.set_config("log_level", "loud").await.unwrap();
        assert!(adapter.validate_config().await.is_err());
    }
}
