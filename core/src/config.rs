//! Configuration persistence
//!
//! The configuration lives in `<config dir>/meetclock/config.toml` (via
//! confy) unless a file is given explicitly. Missing fields are filled from
//! serde defaults, so older or hand-trimmed files keep working.

use std::path::{Path, PathBuf};

pub use meetclock_types::AppConfig;
use thiserror::Error;

const APP_NAME: &str = "meetclock";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("failed to resolve configuration path")]
    Path(#[source] confy::ConfyError),
}

/// Where the configuration is read from and written to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// Platform config directory
    #[default]
    Default,
    /// Explicit file (`--config`)
    File(PathBuf),
}

impl ConfigSource {
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        path.map_or(ConfigSource::Default, ConfigSource::File)
    }

    pub fn path(&self) -> Result<PathBuf, ConfigError> {
        match self {
            ConfigSource::Default => confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
                .map_err(ConfigError::Path),
            ConfigSource::File(path) => Ok(path.clone()),
        }
    }

    /// Load, creating the file with defaults when it does not exist
    pub fn try_load(&self) -> Result<AppConfig, ConfigError> {
        let config = match self {
            ConfigSource::Default => confy::load(APP_NAME, CONFIG_NAME)?,
            ConfigSource::File(path) => confy::load_path(path)?,
        };
        Ok(config)
    }

    /// Load, falling back to defaults when the file is unreadable
    pub fn load(&self) -> AppConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = ?e, source = ?self, "Using default configuration");
                AppConfig::default()
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        match self {
            ConfigSource::Default => confy::store(APP_NAME, CONFIG_NAME, config),
            ConfigSource::File(path) => confy::store_path(path, config),
        }
        .map_err(ConfigError::Save)?;
        tracing::debug!(source = ?self, "Configuration saved");
        Ok(())
    }

    /// Overwrite the stored configuration with defaults
    pub fn reset(&self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig::default();
        self.save(&config)?;
        Ok(config)
    }
}

/// Directory holding the config file (also used for logs and user sounds)
pub fn config_dir(source: &ConfigSource) -> Option<PathBuf> {
    source
        .path()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetclock_types::{Preset, Theme};
    use tempfile::TempDir;

    fn temp_config(dir: &TempDir) -> PathBuf {
        dir.path().join("config.toml")
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let source = ConfigSource::File(temp_config(&dir));

        let config = source.try_load().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let source = ConfigSource::File(temp_config(&dir));

        let mut config = AppConfig::default();
        config.theme = Theme::Dark;
        config.window.opacity = 0.6;
        config.presets.push(Preset::new("Retro", 3600));
        config.shortcuts.mute = String::new();
        source.save(&config).unwrap();

        let loaded = source.try_load().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_merges_defaults() {
        let dir = TempDir::new().unwrap();
        let path = temp_config(&dir);
        std::fs::write(&path, "theme = \"dark\"\n\n[window]\nopacity = 0.5\n").unwrap();

        let loaded = ConfigSource::File(path.clone()).try_load().unwrap();
        assert_eq!(loaded.theme, Theme::Dark);
        assert_eq!(loaded.window.opacity, 0.5);
        assert_eq!(loaded.window.width, 350);
        assert_eq!(loaded.presets.len(), 3);
        assert_eq!(loaded.shortcuts.mute, "ctrl+m");
    }

    #[test]
    fn test_unreadable_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = temp_config(&dir);
        std::fs::write(&path, "this is = = not toml").unwrap();

        let source = ConfigSource::File(path);
        assert!(source.try_load().is_err());
        assert_eq!(source.load(), AppConfig::default());
    }

    #[test]
    fn test_from_arg() {
        assert_eq!(ConfigSource::from_arg(None), ConfigSource::Default);
        let path = PathBuf::from("/tmp/x.toml");
        assert_eq!(
            ConfigSource::from_arg(Some(path.clone())),
            ConfigSource::File(path)
        );
    }
}
