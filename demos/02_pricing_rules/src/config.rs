//! Rule selection file
//!
//! ```toml
//! rule = "percentage"
//! amount = 15.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Which pricing rule is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Flat,
    Percentage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub rule: RuleKind,
    pub amount: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            rule: RuleKind::Flat,
            amount: 5.0,
        }
    }
}

impl PricingConfig {
    pub fn load_from(path: &Path) -> hermes_core::ConfigResult<Self> {
        if !path.exists() {
            let default = Self::default();
            default.save_to(path)?;
            return Ok(default);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> hermes_core::ConfigResult<()> {
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
