//! Configuration file loading with precedence handling.

use super::{CONFIG_ENV, DEFAULT_ITEM_HEIGHT, DEFAULT_PREPARE_DELAY_MS, MODE_ENV, PREPARE_DELAY_ENV};
use crate::feed::FocusMode;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permissions, not a file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// An environment override could not be parsed.
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Parse error details.
        reason: String,
    },

    /// A setting is out of range.
    #[error("Invalid setting {field}: {reason}")]
    InvalidValue {
        /// Setting name.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional. Lives at `~/.config/feedplay/config.toml`:
///
/// ```toml
/// mode = "reference"
/// prepare_delay_ms = 250
/// item_height = 8
/// start_in_background = false
/// log_file_path = "/tmp/feedplay.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Focus mode.
    #[serde(default)]
    pub mode: Option<FocusMode>,

    /// Virtual prepare time of the simulated backend.
    #[serde(default)]
    pub prepare_delay_ms: Option<u64>,

    /// Card height in terminal rows.
    #[serde(default)]
    pub item_height: Option<u16>,

    /// Start with the host in the background.
    #[serde(default)]
    pub start_in_background: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Configuration after defaults, file, environment and CLI are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Focus mode.
    pub mode: FocusMode,
    /// Virtual prepare time.
    pub prepare_delay: Duration,
    /// Card height in terminal rows.
    pub item_height: u16,
    /// Start with the host in the background.
    pub start_in_background: bool,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            mode: FocusMode::Autoplay,
            prepare_delay: Duration::from_millis(DEFAULT_PREPARE_DELAY_MS),
            item_height: DEFAULT_ITEM_HEIGHT,
            start_in_background: false,
            log_file_path: default_log_path(),
        }
    }
}

/// Default log file: `~/.local/state/feedplay/feedplay.log` on Unix, the
/// platform state directory elsewhere, `./feedplay.log` if there is none.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("feedplay").join("feedplay.log"),
        None => PathBuf::from("feedplay.log"),
    }
}

/// Default config file: `~/.config/feedplay/config.toml` on Unix.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("feedplay").join("config.toml"))
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist.
///
/// # Errors
///
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `FEEDPLAY_CONFIG` environment variable
/// 3. Default path `~/.config/feedplay/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge a config file into the defaults.
///
/// # Errors
///
/// `InvalidValue` for an `item_height` of zero.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    if config.item_height == Some(0) {
        return Err(ConfigError::InvalidValue {
            field: "item_height",
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(ResolvedConfig {
        mode: config.mode.unwrap_or(defaults.mode),
        prepare_delay: config
            .prepare_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.prepare_delay),
        item_height: config.item_height.unwrap_or(defaults.item_height),
        start_in_background: config
            .start_in_background
            .unwrap_or(defaults.start_in_background),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    })
}

/// Apply environment overrides: `FEEDPLAY_MODE`, `FEEDPLAY_PREPARE_DELAY_MS`.
///
/// # Errors
///
/// `InvalidEnv` when a set variable does not parse.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(value) = std::env::var(MODE_ENV) {
        config.mode = value.parse::<FocusMode>().map_err(|reason| ConfigError::InvalidEnv {
            var: MODE_ENV,
            value: value.clone(),
            reason,
        })?;
    }

    if let Ok(value) = std::env::var(PREPARE_DELAY_ENV) {
        let ms: u64 = value
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
                var: PREPARE_DELAY_ENV,
                value: value.clone(),
                reason: e.to_string(),
            })?;
        config.prepare_delay = Duration::from_millis(ms);
    }

    Ok(config)
}

/// Values given on the command line. `None` / `false` leave the config
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--mode`.
    pub mode: Option<FocusMode>,
    /// `--prepare-delay-ms`.
    pub prepare_delay_ms: Option<u64>,
    /// `--background`.
    pub background: bool,
}

/// Apply CLI overrides, the highest precedence source.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: &CliOverrides) -> ResolvedConfig {
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    if let Some(ms) = cli.prepare_delay_ms {
        config.prepare_delay = Duration::from_millis(ms);
    }

    if cli.background {
        config.start_in_background = true;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
