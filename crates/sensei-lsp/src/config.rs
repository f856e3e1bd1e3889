//! User configuration for the Sensei LSP.
//!
//! Configuration is stored at `~/.config/sensei/config.json`. Clients can
//! override it per session through `initializationOptions`, which take the
//! same shape.

use std::path::{Path, PathBuf};

use sensei_yaml::LintOptions;
use serde::Deserialize;
use tracing::{debug, info};

/// User configuration for the Sensei LSP.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SenseiUserConfig {
    /// Quiet period after an edit before diagnostics are recomputed.
    pub lint_debounce_ms: u64,
    pub typo: TypoConfig,
    /// Publish hints for missing required keys.
    pub required_hints: bool,
}

impl Default for SenseiUserConfig {
    fn default() -> Self {
        Self {
            lint_debounce_ms: 300,
            typo: TypoConfig::default(),
            required_hints: true,
        }
    }
}

/// Typo linter thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TypoConfig {
    pub min_key_len: usize,
    pub max_distance: usize,
}

impl Default for TypoConfig {
    fn default() -> Self {
        let defaults = LintOptions::default();
        Self {
            min_key_len: defaults.min_key_len,
            max_distance: defaults.max_distance,
        }
    }
}

impl TypoConfig {
    pub fn lint_options(&self) -> LintOptions {
        LintOptions {
            min_key_len: self.min_key_len,
            max_distance: self.max_distance,
        }
    }
}

/// Get the path to the user config file.
///
/// Returns `~/.config/sensei/config.json` on Unix, or the equivalent
/// platform-specific config directory on other platforms.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sensei").join("config.json"))
}

/// Load the user configuration from its default location.
///
/// Returns `Ok(None)` if the config file doesn't exist yet.
pub fn load_config() -> Result<Option<SenseiUserConfig>, LoadConfigError> {
    let Some(path) = config_path() else {
        debug!("No config directory available");
        return Ok(None);
    };
    load_config_from(&path)
}

/// Load the user configuration from `path`.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but couldn't be parsed.
pub fn load_config_from(path: &Path) -> Result<Option<SenseiUserConfig>, LoadConfigError> {
    if !path.exists() {
        debug!(?path, "Config file does not exist yet");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| LoadConfigError::Io {
        path: path.to_path_buf(),
        error: e,
    })?;

    let config: SenseiUserConfig =
        serde_json::from_str(&content).map_err(|e| LoadConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

    info!(?path, debounce_ms = config.lint_debounce_ms, "Loaded user config");
    Ok(Some(config))
}

/// Error loading the user config.
#[derive(Debug)]
pub enum LoadConfigError {
    Io { path: PathBuf, error: std::io::Error },
    Parse { path: PathBuf, error: String },
}

impl std::fmt::Display for LoadConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadConfigError::Io { path, error } => {
                write!(f, "Failed to read config at {}: {}", path.display(), error)
            }
            LoadConfigError::Parse { path, error } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for LoadConfigError {}
