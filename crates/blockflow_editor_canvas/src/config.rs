// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas configuration: grid unit and grid dimensions.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default pixel size of one grid cell
pub const DEFAULT_UNIT: f32 = 20.0;

/// Default grid size in cells (columns, rows)
pub const DEFAULT_DIMENSIONS: [u32; 2] = [40, 20];

/// Grid settings shared by rendering and snapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Pixel size of one grid cell
    pub unit: f32,
    /// Grid size in cells (columns, rows)
    pub dimensions: [u32; 2],
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            unit: DEFAULT_UNIT,
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

impl CanvasConfig {
    /// Create a config
    pub fn new(unit: f32, dimensions: [u32; 2]) -> Self {
        Self { unit, dimensions }
    }

    /// Canvas height in pixels (`unit * rows`)
    pub fn height(&self) -> f32 {
        self.unit * self.dimensions[1] as f32
    }

    /// Canvas width in pixels when the surface does not dictate one
    pub fn width(&self) -> f32 {
        self.unit * self.dimensions[0] as f32
    }

    /// Check the unit is usable and the grid is non-empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.unit.is_finite() || self.unit <= 0.0 {
            return Err(ConfigError::InvalidUnit(self.unit));
        }
        if self.dimensions.contains(&0) {
            return Err(ConfigError::EmptyGrid(self.dimensions));
        }
        Ok(())
    }

    /// Parse and validate a config from RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: CanvasConfig =
            ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }
}

/// Error when loading or validating a config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// RON syntax or shape error
    #[error("Invalid config: {0}")]
    Parse(String),

    /// Unit is zero, negative or not finite
    #[error("Grid unit must be a positive number, got {0}")]
    InvalidUnit(f32),

    /// A grid dimension is zero
    #[error("Grid dimensions must be at least 1x1, got {0:?}")]
    EmptyGrid([u32; 2]),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CanvasConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.height(), 400.0);
        assert_eq!(config.width(), 800.0);
    }

    #[test]
    fn test_from_ron_fills_defaults() {
        let config = CanvasConfig::from_ron("(unit: 10.0)").unwrap();
        assert_eq!(config.unit, 10.0);
        assert_eq!(config.dimensions, DEFAULT_DIMENSIONS);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            CanvasConfig::new(0.0, [4, 4]).validate(),
            Err(ConfigError::InvalidUnit(_))
        ));
        assert!(matches!(
            CanvasConfig::new(f32::NAN, [4, 4]).validate(),
            Err(ConfigError::InvalidUnit(_))
        ));
        assert!(matches!(
            CanvasConfig::from_ron("(dimensions: (0, 3))"),
            Err(ConfigError::EmptyGrid([0, 3]))
        ));
    }
}
