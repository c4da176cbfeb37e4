//! Config path resolution
//!
//! The config directory is taken from `HERMES_CONFIG_DIR` when set, otherwise
//! the current working directory.

use std::path::PathBuf;

use super::{ConfigError, ConfigResult};

/// Environment variable naming the config directory
pub const CONFIG_DIR_ENV: &str = "HERMES_CONFIG_DIR";

/// File name of the core config
pub const CORE_CONFIG_FILE: &str = "hermes.toml";

/// Returns the directory holding hermes config files.
pub fn config_dir() -> ConfigResult<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if dir.is_empty() => Err(ConfigError::NoConfigDirectory),
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(std::env::current_dir()?),
    }
}

/// Returns the core config path.
///
/// Path: `{config_dir}/hermes.toml`
pub fn core_config_path() -> ConfigResult<PathBuf> {
    Ok(config_dir()?.join(CORE_CONFIG_FILE))
}
