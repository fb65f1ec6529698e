//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/notecard/config.toml)
//! 3. Environment variables (NOTECARD_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "NOTECARD";

/// Default dictation locale
pub const DEFAULT_LOCALE: &str = "pt-BR";

/// What to do when the stored collection cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptBlobPolicy {
    /// Back up the unreadable blob and start with no notes
    #[default]
    Reset,
    /// Refuse to open the store
    Fail,
}

impl FromStr for CorruptBlobPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "reset" => Ok(CorruptBlobPolicy::Reset),
            "fail" => Ok(CorruptBlobPolicy::Fail),
            other => anyhow::bail!("Invalid on_corrupt value '{}'. Use 'reset' or 'fail'.", other),
        }
    }
}

impl fmt::Display for CorruptBlobPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptBlobPolicy::Reset => write!(f, "reset"),
            CorruptBlobPolicy::Fail => write!(f, "fail"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (notes blob and its backup)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Locale passed to the speech recognizer
    #[serde(default = "default_locale")]
    pub locale: String,

    /// External transcription command used for dictation (optional)
    #[serde(default)]
    pub recorder_command: Option<String>,

    /// Handling of an unreadable notes blob at startup
    #[serde(default)]
    pub on_corrupt: CorruptBlobPolicy,

    /// Log file path (optional, logs go to stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            locale: default_locale(),
            recorder_command: None,
            on_corrupt: CorruptBlobPolicy::Reset,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (NOTECARD_DATA_DIR, NOTECARD_LOCALE, ...)
    /// 2. Config file (~/.config/notecard/config.toml or NOTECARD_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // NOTECARD_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // NOTECARD_LOCALE
        if let Ok(val) = std::env::var(format!("{}_LOCALE", ENV_PREFIX)) {
            if !val.is_empty() {
                self.locale = val;
            }
        }

        // NOTECARD_RECORDER_COMMAND
        if let Ok(val) = std::env::var(format!("{}_RECORDER_COMMAND", ENV_PREFIX)) {
            self.recorder_command = if val.is_empty() { None } else { Some(val) };
        }

        // NOTECARD_ON_CORRUPT
        if let Ok(val) = std::env::var(format!("{}_ON_CORRUPT", ENV_PREFIX)) {
            self.on_corrupt = val
                .parse()
                .with_context(|| format!("Invalid {}_ON_CORRUPT", ENV_PREFIX))?;
        }

        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with NOTECARD_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notecard")
            .join("config.toml")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notecard")
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}
