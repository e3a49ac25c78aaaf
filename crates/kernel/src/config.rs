use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use voxelspace_voxel::{DEFAULT_CHUNK_SIZE, DEFAULT_MIN_NODE_SIZE, TerrainConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Engine settings, read from YAML. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chunk_size: i32,
    /// Smallest octree node side inside a chunk.
    pub chunk_min_node_size: i32,
    /// Fixed clock step. `None` follows the wall clock.
    pub fixed_timestep_us: Option<u64>,
    /// Stop after this many ticks even if nothing asked to quit.
    pub max_ticks: Option<u64>,
    /// Units per second.
    pub player_speed: f64,
    /// Radians per pixel of pointer motion.
    pub mouse_sensitivity: f64,
    pub terrain: TerrainConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_min_node_size: DEFAULT_MIN_NODE_SIZE,
            fixed_timestep_us: None,
            max_ticks: None,
            player_speed: 10.0,
            mouse_sensitivity: 0.01,
            terrain: TerrainConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size <= 0 || self.chunk_size.count_ones() != 1 {
            return Err(ConfigError::Invalid(format!(
                "chunk_size must be a positive power of two, got {}",
                self.chunk_size
            )));
        }
        if self.chunk_min_node_size <= 0 {
            return Err(ConfigError::Invalid(format!(
                "chunk_min_node_size must be positive, got {}",
                self.chunk_min_node_size
            )));
        }
        if self.fixed_timestep_us == Some(0) {
            return Err(ConfigError::Invalid(
                "fixed_timestep_us must be non-zero".into(),
            ));
        }
        if !self.player_speed.is_finite() || self.player_speed < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "player_speed must be finite and non-negative, got {}",
                self.player_speed
            )));
        }
        if !self.mouse_sensitivity.is_finite() {
            return Err(ConfigError::Invalid(
                "mouse_sensitivity must be finite".into(),
            ));
        }
        if self.terrain.extent < 0 {
            return Err(ConfigError::Invalid(format!(
                "terrain.extent must be non-negative, got {}",
                self.terrain.extent
            )));
        }
        Ok(())
    }
}
