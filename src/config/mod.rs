//! Configuration management for the input subsystem
//!
//! Handles loading, validating and saving the YAML configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::info;

use crate::input::types::GameAction;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default = "default_frame_rate")]
    pub frame_rate_hz: u32,
}

/// Input manager tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputSettings {
    /// Delay before a delayed learning session stops, from its first input
    #[serde(default = "default_learning_timeout_ms")]
    pub learning_timeout_ms: u64,
    /// Scale applied to zero-width ranges by movement queries
    #[serde(default = "default_keyboard_scale_factor")]
    pub keyboard_scale_factor: f32,
    /// Bindings installed when no stored mappings exist
    #[serde(default = "default_key_bindings")]
    pub default_bindings: Vec<KeyBinding>,
    /// Lock each learning session to the first control observed
    #[serde(default)]
    pub exclusive_learning: bool,
}

/// Keyboard key bound to an action
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyBinding {
    pub key: String,
    pub action: String,
}

impl KeyBinding {
    pub fn new(key: &str, action: GameAction) -> Self {
        Self {
            key: key.to_string(),
            action: action.as_str().to_string(),
        }
    }
}

/// Mapping storage configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Sled database directory; defaults to the application state dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: InputSettings::default(),
            storage: StorageConfig::default(),
            frame_rate_hz: default_frame_rate(),
        }
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            learning_timeout_ms: default_learning_timeout_ms(),
            keyboard_scale_factor: default_keyboard_scale_factor(),
            default_bindings: default_key_bindings(),
            exclusive_learning: false,
        }
    }
}

impl InputSettings {
    pub fn learning_timeout(&self) -> Duration {
        Duration::from_millis(self.learning_timeout_ms)
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.frame_rate_hz == 0 || self.frame_rate_hz > 1000 {
            anyhow::bail!("frame_rate_hz {} is invalid (must be 1-1000)", self.frame_rate_hz);
        }

        let input = &self.input;
        if !(input.keyboard_scale_factor.is_finite() && input.keyboard_scale_factor > 0.0) {
            anyhow::bail!(
                "keyboard_scale_factor {} is invalid (must be a positive number)",
                input.keyboard_scale_factor
            );
        }

        for (idx, binding) in input.default_bindings.iter().enumerate() {
            if binding.key.is_empty() {
                anyhow::bail!("Default binding {} key cannot be empty", idx);
            }
            if binding.action.is_empty() {
                anyhow::bail!("Default binding {} ('{}') action cannot be empty", idx, binding.key);
            }
        }

        Ok(())
    }
}

// Default value functions
fn default_frame_rate() -> u32 { 60 }
fn default_learning_timeout_ms() -> u64 { 2000 }
fn default_keyboard_scale_factor() -> f32 { 0.75 }

/// WASD movement, `p` and space to fire
pub fn default_key_bindings() -> Vec<KeyBinding> {
    vec![
        KeyBinding::new("w", GameAction::Up),
        KeyBinding::new("s", GameAction::Down),
        KeyBinding::new("a", GameAction::Left),
        KeyBinding::new("d", GameAction::Right),
        KeyBinding::new("p", GameAction::Fire),
        KeyBinding::new(" ", GameAction::Fire),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "input:\n  learning_timeout_ms: 500\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.input.learning_timeout(), Duration::from_millis(500));
        assert_eq!(config.input.keyboard_scale_factor, 0.75);
        assert_eq!(config.input.default_bindings.len(), 6);
        assert_eq!(config.frame_rate_hz, 60);
        assert!(config.storage.path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.input.keyboard_scale_factor = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.input.default_bindings.push(KeyBinding {
            key: String::new(),
            action: "fire".to_string(),
        });
        assert!(config.validate().is_err());

        let config = AppConfig { frame_rate_hz: 0, ..AppConfig::default() };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let mut config = AppConfig { frame_rate_hz: 120, ..AppConfig::default() };
        config.input.exclusive_learning = true;
        config.storage.path = Some(PathBuf::from("/tmp/vidshooter-mappings"));

        let file = NamedTempFile::new().unwrap();
        config.save(file.path()).await.unwrap();

        let loaded = AppConfig::load(file.path()).await.unwrap();
        assert_eq!(loaded.frame_rate_hz, 120);
        assert!(loaded.input.exclusive_learning);
        assert_eq!(loaded.input.default_bindings, default_key_bindings());
        assert_eq!(loaded.storage.path, config.storage.path);
    }

    #[tokio::test]
    async fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(config.input.learning_timeout_ms, 2000);
    }
}
