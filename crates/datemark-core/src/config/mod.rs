//! Configuration management for Datemark.
//!
//! Configuration is loaded from the platform config directory
//! (`datemark/config.toml`) with sensible defaults. Every field has a
//! default, so a partial file only overrides what it names. CLI flags are
//! applied on top by the binary.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Datemark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Watermark appearance
    pub watermark: WatermarkConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.datemark.datemark/config.toml
    /// - Linux: ~/.config/datemark/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\datemark\config\config.toml
    ///
    /// Falls back to ~/.datemark/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "datemark", "datemark")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".datemark").join("config.toml")
            })
    }

    /// Get the configured font path with `~` expanded.
    pub fn font_path(&self) -> Option<PathBuf> {
        self.watermark.font_path.as_ref().map(|path| {
            let path_str = path.to_string_lossy();
            let expanded = shellexpand::tilde(&path_str);
            PathBuf::from(expanded.into_owned())
        })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Anchor, Color};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.watermark.font_size, 20);
        assert_eq!(config.watermark.color, Color::WHITE);
        assert_eq!(config.watermark.position, Anchor::BottomRight);
        assert_eq!(config.processing.parallel_workers, 1);
        assert_eq!(config.limits.max_file_size_mb, 100);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[watermark]"));
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("position = \"bottom-right\""));
        assert!(toml.contains("color = \"255,255,255\""));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[watermark]\nfont_size = 40\ncolor = \"black\"\nposition = \"top_left\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.watermark.font_size, 40);
        assert_eq!(config.watermark.color, Color::BLACK);
        assert_eq!(config.watermark.position, Anchor::TopLeft);
        assert!(config.watermark.shadow);
        assert_eq!(config.processing.supported_formats.len(), 6);
    }

    #[test]
    fn test_unknown_position_in_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[watermark]\nposition = \"upper-middle\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.watermark.position, Anchor::BottomRight);
    }

    #[test]
    fn test_invalid_color_in_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[watermark]\ncolor = \"300,0,0\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_font_path_expands_tilde() {
        let mut config = Config::default();
        assert!(config.font_path().is_none());

        config.watermark.font_path = Some(PathBuf::from("~/fonts/Inter.ttf"));
        let expanded = config.font_path().unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("fonts/Inter.ttf"));
    }
}
