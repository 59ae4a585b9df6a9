//! Application path management for portable and installed modes.
//!
//! - **Portable mode**: a `.portable` marker file next to the executable keeps
//!   the config and the mapping database in that directory.
//! - **Installed mode** (default): data lives under the platform data
//!   directory (`~/.local/share/Vidshooter`, `%APPDATA%\Vidshooter`, ...).

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::StorageConfig;

/// Application name used for directories in installed mode
const APP_NAME: &str = "Vidshooter";

/// Marker file enabling portable mode
const PORTABLE_MARKER: &str = ".portable";

/// Application paths for config and state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Path to the configuration file
    pub config: PathBuf,
    /// Path to the state directory (sled database)
    pub state_dir: PathBuf,
    /// Whether running in portable mode (config next to exe)
    pub is_portable: bool,
}

impl AppPaths {
    /// Detect the paths for the running executable.
    pub fn detect() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        Self::resolve(&exe_dir, dirs::data_dir())
    }

    /// Resolve paths from an executable directory and the platform data dir.
    ///
    /// Falls back to the executable directory when there is no data dir.
    pub fn resolve(exe_dir: &Path, data_dir: Option<PathBuf>) -> Self {
        if exe_dir.join(PORTABLE_MARKER).exists() {
            debug!("Running in portable mode ({})", exe_dir.display());
            return Self {
                config: exe_dir.join("config.yaml"),
                state_dir: exe_dir.join(".state"),
                is_portable: true,
            };
        }

        let app_data = data_dir.unwrap_or_else(|| exe_dir.to_path_buf()).join(APP_NAME);
        debug!("Running in installed mode ({})", app_data.display());

        Self {
            config: app_data.join("config.yaml"),
            state_dir: app_data.join("state"),
            is_portable: false,
        }
    }

    /// Ensure the state and config directories exist.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        if !self.state_dir.exists() {
            debug!("Creating state directory: {}", self.state_dir.display());
            std::fs::create_dir_all(&self.state_dir).with_context(|| {
                format!("Failed to create state directory {}", self.state_dir.display())
            })?;
        }

        if let Some(config_parent) = self.config.parent() {
            if !config_parent.as_os_str().is_empty() && !config_parent.exists() {
                debug!("Creating config directory: {}", config_parent.display());
                std::fs::create_dir_all(config_parent)?;
            }
        }

        Ok(())
    }

    /// Get the sled database path (within state_dir)
    pub fn sled_db_path(&self) -> PathBuf {
        self.state_dir.join("mappings")
    }

    /// Mapping database path, honoring an explicit `storage.path`
    pub fn mapping_db_path(&self, storage: &StorageConfig) -> PathBuf {
        storage.path.clone().unwrap_or_else(|| self.sled_db_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_installed_mode_uses_data_dir() {
        let exe = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();

        let paths = AppPaths::resolve(exe.path(), Some(data.path().to_path_buf()));
        assert!(!paths.is_portable);
        assert_eq!(paths.config, data.path().join("Vidshooter").join("config.yaml"));
        assert_eq!(paths.sled_db_path(), data.path().join("Vidshooter").join("state").join("mappings"));
    }

    #[test]
    fn test_portable_marker_keeps_files_next_to_exe() {
        let exe = TempDir::new().unwrap();
        std::fs::write(exe.path().join(".portable"), "").unwrap();

        let paths = AppPaths::resolve(exe.path(), None);
        assert!(paths.is_portable);
        assert_eq!(paths.state_dir, exe.path().join(".state"));

        paths.ensure_directories().unwrap();
        assert!(paths.state_dir.is_dir());
    }

    #[test]
    fn test_storage_path_override() {
        let paths = AppPaths::resolve(Path::new("/nonexistent"), Some(PathBuf::from("/data")));
        let storage = StorageConfig {
            path: Some(PathBuf::from("/srv/mappings")),
        };
        assert_eq!(paths.mapping_db_path(&storage), PathBuf::from("/srv/mappings"));
        assert_eq!(
            paths.mapping_db_path(&StorageConfig::default()),
            PathBuf::from("/data/Vidshooter/state/mappings")
        );
    }
}
