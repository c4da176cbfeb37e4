//! Configuration for hermes
//!
//! [`CoreConfig`] is a serde struct stored as TOML. A missing file is created
//! with defaults on first load, and a loaded config can be reloaded in place.
//!
//! # Example
//!
//! ```ignore
//! use hermes_core::{ClassManager, CoreConfig, ProxyClass};
//!
//! let config = CoreConfig::load().unwrap_or_default();
//! hermes_core::logging::init(&config);
//!
//! let manager = ClassManager::with_proxy(ProxyClass::wrapping::<CounterProxy>())
//!     .with_config(&config);
//! ```

mod loader;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::registry::DEFAULT_COMPACT_EVERY;

pub use loader::{config_dir, core_config_path, CONFIG_DIR_ENV, CORE_CONFIG_FILE};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// `HERMES_CONFIG_DIR` is set but empty
    #[error("Config directory not available - HERMES_CONFIG_DIR is empty")]
    NoConfigDirectory,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Core configuration.
///
/// Loaded from `hermes.toml` in the config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    /// Log filter directive used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Registrations between registry compactions
    pub compact_every: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            log_filter: "info".to_string(),
            compact_every: DEFAULT_COMPACT_EVERY,
        }
    }
}

impl CoreConfig {
    /// Load core config from the default location, creating it if missing.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(core_config_path()?)
    }

    /// Save core config to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(core_config_path()?)
    }

    /// Reload core config from the default location.
    pub fn reload(&mut self) -> ConfigResult<()> {
        self.reload_from(core_config_path()?)
    }

    /// Load config from `path`, creating a default file if missing.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded core config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save_to(path)?;
            tracing::info!("Created default core config at {:?}", path);
            Ok(default)
        }
    }

    /// Save config to `path`.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved core config to {:?}", path);
        Ok(())
    }

    /// Replace self with the contents of `path`.
    pub fn reload_from(&mut self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded core config from {:?}", path);
        Ok(())
    }

    /// Filter directive the logger should start with
    pub fn effective_filter(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_filter
        }
    }
}
