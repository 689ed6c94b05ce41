//! Context configuration

use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stack capacities and texture unit count for a new context.
///
/// Defaults follow the limits a desktop GL 1.x implementation typically
/// advertises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimConfig {
    pub modelview_stack_depth: usize,
    pub projection_stack_depth: usize,
    pub texture_stack_depth: usize,
    pub texture_units: usize,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            modelview_stack_depth: 64,
            projection_stack_depth: 16,
            texture_stack_depth: 16,
            texture_units: 8,
        }
    }
}

impl ShimConfig {
    /// Read a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate a JSON config string.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: ShimConfig =
            serde_json::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let depths = [
            ("modelview", self.modelview_stack_depth),
            ("projection", self.projection_stack_depth),
            ("texture", self.texture_stack_depth),
        ];
        if let Some((stack, _)) = depths.iter().find(|(_, depth)| *depth == 0) {
            return Err(ConfigError::ZeroStackDepth { stack: *stack });
        }
        if self.texture_units == 0 {
            return Err(ConfigError::NoTextureUnits);
        }
        Ok(())
    }
}
