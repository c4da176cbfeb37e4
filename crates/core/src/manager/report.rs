//! Outcome of a hot-swap

use std::fmt;

use crate::error::ManagerError;
use crate::registry::ProxyKey;

/// Mode a manager settled on after probing its proxy class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerMode {
    /// No usable proxy class: bare backing objects, no registry
    Plain,
    /// Proxies are handed out and swapped on update
    Reloadable,
}

/// One proxy the sweep could not swap
#[derive(Debug, Clone)]
pub struct SwapFailure {
    pub key: ProxyKey,
    pub error: ManagerError,
}

/// Summary of one [`ClassManager::update`](crate::ClassManager::update)
#[derive(Debug, Clone)]
pub struct SwapReport {
    /// Name of the class installed by the update
    pub class: &'static str,
    pub mode: ManagerMode,
    /// Proxies whose backing object was replaced
    pub swapped: usize,
    pub failures: Vec<SwapFailure>,
    /// Dead registry entries dropped when the sweep took its snapshot
    pub pruned: usize,
}

impl SwapReport {
    pub(crate) fn new(class: &'static str, mode: ManagerMode) -> Self {
        Self {
            class,
            mode,
            swapped: 0,
            failures: Vec::new(),
            pruned: 0,
        }
    }

    /// `true` if every visited proxy was swapped
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of proxies the sweep visited
    pub fn visited(&self) -> usize {
        self.swapped + self.failures.len()
    }
}

impl fmt::Display for SwapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} swapped, {} failed, {} pruned",
            self.class,
            self.swapped,
            self.failures.len(),
            self.pruned
        )
    }
}
