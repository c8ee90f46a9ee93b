//! Configuration file management for tally.
//!
//! Provides a TOML-based config file at `~/.config/tally/config.toml` and a
//! resolution chain for the data file path: CLI flag > env var > config
//! file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub storage: StorageSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageSection {
    /// Path to the progress JSON document.
    pub path: String,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the tally config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/tally` or `~/.config/tally`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("tally");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tally")
}

/// Return the path to the tally config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default location for the progress document:
/// `$XDG_DATA_HOME/tally/progress.json` or `~/.local/share/tally/progress.json`.
pub fn default_data_path() -> PathBuf {
    let data_dir = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg).join("tally")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local")
            .join("share")
            .join("tally")
    };
    data_dir.join("progress.json")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct TallyConfig {
    pub data_path: PathBuf,
}

impl TallyConfig {
    /// Resolve the data file path using the chain:
    /// CLI flag > `TALLY_DATA_FILE` env > config file > default.
    pub fn resolve(cli_data_file: Option<&str>) -> Self {
        let data_path = if let Some(path) = cli_data_file {
            PathBuf::from(path)
        } else if let Ok(path) = std::env::var("TALLY_DATA_FILE") {
            PathBuf::from(path)
        } else if let Ok(cfg) = load_config() {
            PathBuf::from(cfg.storage.path)
        } else {
            default_data_path()
        };
        Self { data_path }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("tally/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }

    #[test]
    fn default_data_path_ends_with_progress_json() {
        let path = default_data_path();
        assert!(
            path.ends_with("tally/progress.json"),
            "unexpected data path: {}",
            path.display()
        );
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("tally");
        let path = dir.join("config.toml");

        let original = ConfigFile {
            storage: StorageSection {
                path: "/srv/tally/progress.json".to_string(),
            },
        };

        std::fs::create_dir_all(&dir).unwrap();
        let contents = toml::to_string_pretty(&original).unwrap();
        std::fs::write(&path, &contents).unwrap();

        let loaded_contents = std::fs::read_to_string(&path).unwrap();
        let loaded: ConfigFile = toml::from_str(&loaded_contents).unwrap();
        assert_eq!(loaded.storage.path, original.storage.path);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_env() {
        let _lock = lock_env();

        unsafe { std::env::set_var("TALLY_DATA_FILE", "/env/progress.json") };
        let config = TallyConfig::resolve(Some("/cli/progress.json"));
        assert_eq!(config.data_path, PathBuf::from("/cli/progress.json"));
        unsafe { std::env::remove_var("TALLY_DATA_FILE") };
    }

    #[test]
    fn resolve_with_env_var() {
        let _lock = lock_env();

        unsafe { std::env::set_var("TALLY_DATA_FILE", "/env/progress.json") };
        let config = TallyConfig::resolve(None);
        assert_eq!(config.data_path, PathBuf::from("/env/progress.json"));
        unsafe { std::env::remove_var("TALLY_DATA_FILE") };
    }

    #[test]
    fn resolve_falls_back_to_default_when_nothing_set() {
        let _lock = lock_env();

        unsafe { std::env::remove_var("TALLY_DATA_FILE") };
        // Point HOME and XDG vars at a temp dir so no real config is found.
        let tmp = tempfile::TempDir::new().unwrap();
        let orig_home = std::env::var("HOME").ok();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("HOME", tmp.path()) };
        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };

        let config = TallyConfig::resolve(None);

        match orig_home {
            Some(h) => unsafe { std::env::set_var("HOME", h) },
            None => unsafe { std::env::remove_var("HOME") },
        }
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        assert!(
            config.data_path.ends_with("tally/progress.json"),
            "unexpected fallback path: {}",
            config.data_path.display()
        );
    }
}
