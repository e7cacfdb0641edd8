//! Engine and application configuration, loadable from TOML

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::Difficulty;
use crate::error::ConfigError;

/// Tuning knobs for the AI engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum plies searched by Hard
    pub search_depth: u8,
    /// Children kept per node after move ordering
    pub max_candidates: usize,
    /// Wall-clock budget for one search; 0 disables the deadline
    pub time_limit_ms: u64,
    /// Optional node budget for one search
    pub max_nodes: Option<u64>,
    /// Hard skips tree search while fewer stones than this are down
    pub opening_stones: u32,
    /// Chebyshev radius around centre used for opening moves
    pub opening_radius: u8,
    /// Weight on the opponent's patterns in position values (> 1.0 favours defense)
    pub defense_factor: f64,
    /// Learning bias is clamped to +/- this per record
    pub bias_clamp: i32,
    /// Position count above which the learning store evicts
    pub store_ceiling: usize,
    /// Position count the learning store evicts down to
    pub store_floor: usize,
    /// Learning store directory; `None` keeps learning in memory only
    pub data_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_depth: 3,
            max_candidates: 30,
            time_limit_ms: 1500,
            max_nodes: None,
            opening_stones: 8,
            opening_radius: 5,
            defense_factor: 1.1,
            bias_clamp: 100,
            store_ceiling: 3000,
            store_floor: 2000,
            data_dir: None,
        }
    }
}

impl EngineConfig {
    #[inline]
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_depth == 0 {
            return Err(ConfigError::Validation(
                "engine.search_depth must be > 0".into(),
            ));
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::Validation(
                "engine.max_candidates must be > 0".into(),
            ));
        }
        if self.defense_factor < 1.0 {
            return Err(ConfigError::Validation(
                "engine.defense_factor must be >= 1.0".into(),
            ));
        }
        if self.bias_clamp < 0 {
            return Err(ConfigError::Validation(
                "engine.bias_clamp must be >= 0".into(),
            ));
        }
        if self.store_floor > self.store_ceiling {
            return Err(ConfigError::Validation(
                "engine.store_floor must not exceed engine.store_ceiling".into(),
            ));
        }
        Ok(())
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub difficulty: Difficulty,
    /// Minimum time the AI appears to think, for pacing only
    pub ai_delay_ms: u64,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Hard,
            ai_delay_ms: 700,
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()
    }
}
