//! Configuration management for reeltimer
//!
//! Config is stored at ~/.config/reeltimer/config.toml. The TMDB API key is
//! never bundled: it comes from the command line, the `TMDB_API_KEY`
//! environment variable, or the config file, in that order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::session::FetchPolicy;

/// Environment variable holding the TMDB API key
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No TMDB API key: pass --api-key, set TMDB_API_KEY, or add tmdb_api_key to the config file")]
    MissingApiKey,

    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TMDB v3 API key
    pub tmdb_api_key: Option<String>,
    /// Original language filter for discover (ISO 639-1)
    pub language: String,
    /// Highest discover page drawn when refilling
    pub max_page: u32,
    /// Refills allowed per fetch before giving up
    pub max_refills: u32,
    /// Alarm sound file played on expiry
    pub alarm_sound: Option<PathBuf>,
    /// Player used for the alarm sound (paplay, afplay, mpv, ffplay)
    pub alarm_command: Option<String>,
    /// Log file used in TUI mode
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let policy = FetchPolicy::default();
        Self {
            tmdb_api_key: None,
            language: "hi".to_string(),
            max_page: policy.max_page,
            max_refills: policy.max_refills,
            alarm_sound: None,
            alarm_command: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Get config file path (~/.config/reeltimer/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reeltimer").join("config.toml"))
    }

    /// Default log file (~/.cache/reeltimer/reeltimer.log)
    pub fn default_log_file() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("reeltimer").join("reeltimer.log"))
    }

    /// Load config from the default path, or defaults if absent
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Resolve the API key: explicit flag, then environment, then file
    pub fn api_key(&self, flag: Option<&str>) -> Result<String, ConfigError> {
        let env = std::env::var(API_KEY_ENV).ok();
        resolve_api_key(flag, env.as_deref(), self.tmdb_api_key.as_deref())
    }

    /// Refill policy from config values
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            max_page: self.max_page.max(1),
            max_refills: self.max_refills.max(1),
        }
    }
}

fn resolve_api_key(
    flag: Option<&str>,
    env: Option<&str>,
    file: Option<&str>,
) -> Result<String, ConfigError> {
    [flag, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|k| !k.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingApiKey)
}
