//! Application settings.
//!
//! Settings are stored as TOML with platform-specific directory resolution:
//!
//! - Linux: `~/.config/LayerShortcuts/settings.toml`
//! - macOS: `~/Library/Application Support/LayerShortcuts/settings.toml`
//! - Windows: `%APPDATA%\LayerShortcuts\settings.toml`
//!
//! Shortcut configurations themselves are JSON files found through the
//! search path; see [`crate::config::ConfigLibrary`].

use crate::constants::CONFIG_DIR_NAME;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Logging preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Extra directories scanned for shortcut configurations, after the
    /// default `pdks` directory
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
    /// Logging preferences
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    /// Creates default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific settings directory.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the settings file.
    pub fn settings_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.toml"))
    }

    /// Directory holding the user's shortcut configurations.
    pub fn default_pdk_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("pdks"))
    }

    /// Loads settings from the default location.
    ///
    /// If the file doesn't exist, returns default settings.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_file_path()?)
    }

    /// Loads settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read settings file: {}", path.display()))?;

        let settings: Self = toml::from_str(&content)
            .context(format!("Failed to parse settings file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Saves settings to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_file_path()?)
    }

    /// Saves settings to an explicit path using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .context(format!("Failed to create settings directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, content).context(format!(
            "Failed to write temp settings file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp settings file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates settings values.
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log level '{}': expected one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            );
        }
        Ok(())
    }

    /// Search path for the configuration library: `extra` first when given,
    /// otherwise the default `pdks` directory followed by `search_paths`.
    ///
    /// Duplicates are removed, keeping the first occurrence.
    #[must_use]
    pub fn effective_search_path(&self, extra: &[PathBuf]) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        if extra.is_empty() {
            if let Ok(dir) = Self::default_pdk_dir() {
                paths.push(dir);
            }
            paths.extend(self.search_paths.iter().cloned());
        } else {
            paths.extend(extra.iter().cloned());
        }

        let mut unique = Vec::with_capacity(paths.len());
        for path in paths {
            if !unique.contains(&path) {
                unique.push(path);
            }
        }
        unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_new() {
        let settings = Settings::new();
        assert!(settings.search_paths.is_empty());
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_settings_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::new();
        settings.search_paths.push(PathBuf::from("/opt/pdks"));
        settings.logging.level = "debug".to_string();
        settings.save_to(&path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "search_paths = [\"/tmp/pdks\"]\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.search_paths, vec![PathBuf::from("/tmp/pdks")]);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut settings = Settings::new();
        settings.logging.level = "loud".to_string();
        assert!(settings.validate().is_err());

        let temp_dir = TempDir::new().unwrap();
        assert!(settings.save_to(&temp_dir.path().join("s.toml")).is_err());
    }

    #[test]
    fn test_effective_search_path() {
        let settings = Settings {
            search_paths: vec![PathBuf::from("/a"), PathBuf::from("/a"), PathBuf::from("/b")],
            ..Settings::default()
        };

        let explicit = settings.effective_search_path(&[PathBuf::from("/x")]);
        assert_eq!(explicit, vec![PathBuf::from("/x")]);

        let configured = settings.effective_search_path(&[]);
        assert!(configured.ends_with(&[PathBuf::from("/a"), PathBuf::from("/b")]));
    }
}
