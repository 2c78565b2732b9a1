//! Pipeline configuration
//!
//! JSON-backed settings for the motion interval, earth model, sample log
//! and validation limits. Every field has a default, so partial files load.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::algorithms::dead_reckoning::LongitudeScaling;
use crate::core::constants::{DEFAULT_MAX_LOGGED_SAMPLES, DEFAULT_MOTION_INTERVAL_S, EARTH_RADIUS_M};
use crate::validation::data::ValidationConfig;

/// Fusion pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Device-motion update period, also used as the integration step (seconds)
    pub motion_update_interval_s: f64,
    /// Earth radius for position propagation (meters)
    pub earth_radius_m: f64,
    /// Which angle scales east displacement into longitude
    pub longitude_scaling: LongitudeScaling,
    /// Wrap propagated longitudes into [-180, 180)
    pub wrap_longitude: bool,
    /// Maximum retained samples, `None` keeps everything
    pub max_logged_samples: Option<usize>,
    /// Start GPS updates as soon as access is granted
    pub location_tracking_enabled: bool,
    pub heading_updates_enabled: bool,
    pub validation: ValidationConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            motion_update_interval_s: DEFAULT_MOTION_INTERVAL_S,
            earth_radius_m: EARTH_RADIUS_M,
            longitude_scaling: LongitudeScaling::Latitude,
            wrap_longitude: false,
            max_logged_samples: Some(DEFAULT_MAX_LOGGED_SAMPLES),
            location_tracking_enabled: true,
            heading_updates_enabled: true,
            validation: ValidationConfig::default(),
        }
    }
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FusionConfig {
    /// Load configuration from a JSON file and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;

        let config: FusionConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path_str,
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path_str.clone(),
            source,
        })?;

        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path_str,
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let interval = self.motion_update_interval_s;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "motion_update_interval_s",
                value: interval.to_string(),
                reason: "must be a positive number of seconds",
            });
        }
        if interval > self.validation.max_delta_time_s {
            return Err(ConfigError::InvalidParameter {
                parameter: "motion_update_interval_s",
                value: interval.to_string(),
                reason: "exceeds validation.max_delta_time_s, every sample would be rejected",
            });
        }
        if !self.earth_radius_m.is_finite() || self.earth_radius_m <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "earth_radius_m",
                value: self.earth_radius_m.to_string(),
                reason: "must be positive",
            });
        }
        if self.max_logged_samples == Some(0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "max_logged_samples",
                value: "0".to_string(),
                reason: "use null for an unbounded log",
            });
        }
        if !(self.validation.max_acceleration_mps2 > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "validation.max_acceleration_mps2",
                value: self.validation.max_acceleration_mps2.to_string(),
                reason: "must be positive",
            });
        }
        if let Some(tolerance) = self.validation.rotation_tolerance {
            if !(tolerance > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    parameter: "validation.rotation_tolerance",
                    value: tolerance.to_string(),
                    reason: "must be positive",
                });
            }
        }
        Ok(())
    }
}
