//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::CoreConfig;

/// Install a fmt subscriber filtered by `RUST_LOG`, or by the config when unset
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(config: &CoreConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
