//! Analysis configuration.
//!
//! ```toml
//! overflow = "saturate"     # or "wrap" (default)
//! value_width = "long"      # width used when folding constants, default "int"
//! max_block_visits = 5000
//! collect_diagnostics = true
//! ```

use crate::error::ConfigError;
use crate::range::{IntWidth, OverflowPolicy, RangeDomain};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default bound on worklist block visits per routine.
pub const DEFAULT_MAX_BLOCK_VISITS: usize = 10_000;

/// Settings fixed before an analysis run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub overflow: OverflowPolicy,
    pub value_width: IntWidth,
    pub max_block_visits: usize,
    pub collect_diagnostics: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::default(),
            value_width: IntWidth::default(),
            max_block_visits: DEFAULT_MAX_BLOCK_VISITS,
            collect_diagnostics: false,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_value_width(mut self, width: IntWidth) -> Self {
        self.value_width = width;
        self
    }

    pub fn with_diagnostics(mut self, collect: bool) -> Self {
        self.collect_diagnostics = collect;
        self
    }

    /// The range arithmetic for this configuration.
    pub fn domain(&self) -> RangeDomain {
        RangeDomain::new(self.overflow)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_block_visits == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_block_visits".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
