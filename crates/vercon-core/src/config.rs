use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use vercon_util::errors::{VerconError, VerconResult};

/// Global user configuration loaded from `~/.vercon/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Text report settings from `[report]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Joins referrer lists, e.g. `app 1.0.0, http 2.1.0`.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Spaces per nesting level.
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            indent: default_indent(),
        }
    }
}

fn default_separator() -> String {
    ", ".to_string()
}

fn default_indent() -> usize {
    2
}

/// Logging settings from `[log]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

impl GlobalConfig {
    /// Load the global configuration from `~/.vercon/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> VerconResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load the configuration from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> VerconResult<Self> {
        if !path.is_file() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| VerconError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content).map_err(Into::into)
    }

    /// Parse configuration from TOML text.
    pub fn parse_toml(content: &str) -> Result<Self, VerconError> {
        toml::from_str(content).map_err(|e| VerconError::Config {
            message: format!("Failed to parse config: {e}"),
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the vercon data directory (`~/.vercon/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".vercon")
}
