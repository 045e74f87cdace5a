//! Configuration: built-in defaults, `config.toml`, environment and CLI.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, CliOverrides, ConfigError,
    ConfigFile, ResolvedConfig,
};

/// Default virtual prepare time of the simulated backend.
pub const DEFAULT_PREPARE_DELAY_MS: u64 = 400;

/// Default card height in terminal rows.
pub const DEFAULT_ITEM_HEIGHT: u16 = 6;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "FEEDPLAY_CONFIG";

/// Environment variable overriding the focus mode.
pub const MODE_ENV: &str = "FEEDPLAY_MODE";

/// Environment variable overriding the prepare delay.
pub const PREPARE_DELAY_ENV: &str = "FEEDPLAY_PREPARE_DELAY_MS";
