//! Top-level configuration.
//!
//! All settings live in a TOML file; every table and field has a default so
//! a partial (or absent) file is fine.
//!
//! ```toml
//! [filter]
//! num_particles = 300
//! d_thresh = 0.2
//!
//! [filter.motion]
//! sigma_turn = 0.01
//! sigma_dist = 0.1
//!
//! [runtime]
//! cycle_timeout_ms = 50
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::engine::FilterConfig;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] basic_toml::Error),
}

/// Thread/runtime tuning.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Receive timeout of the localization thread loop, which doubles as the
    /// retry cadence for scans awaiting odometry alignment, milliseconds.
    pub cycle_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cycle_timeout_ms: 50,
        }
    }
}

/// Aggregate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Estimator configuration.
    pub filter: FilterConfig,
    /// Thread/runtime tuning.
    pub runtime: RuntimeConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&contents)?)
    }

    /// Load from a file when given, warn and fall back to defaults when the
    /// file is missing or malformed.
    pub fn load_or_default(path: Option<&str>) -> Self {
        match path {
            Some(p) => match Self::load(p) {
                Ok(config) => {
                    log::info!("loaded configuration from {p}");
                    config
                }
                Err(e) => {
                    log::warn!("{e}; using default configuration");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }
}
