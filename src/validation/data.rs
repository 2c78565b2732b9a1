//! Sample validation ahead of the fusion engine
//!
//! Raw sensor feeds occasionally deliver NaN matrices, absurd accelerations
//! or fixes outside the geodetic range. Those are rejected here so they never
//! reach the integrator and poison the position state.

use serde::{Deserialize, Serialize};

use crate::algorithms::orientation::RotationMatrix;
use crate::core::types::{Coordinate, DeviceMotion};
use crate::core::units::AccelerationUnit;
use crate::core::vector::Vector3;
use crate::validation::error::{FusionError, FusionResult};

/// Configuration for sample validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Largest accepted acceleration magnitude (m/s²)
    pub max_acceleration_mps2: f64,
    /// Largest accepted integration step (seconds)
    pub max_delta_time_s: f64,
    /// When set, rotation matrices must be orthonormal within this tolerance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_tolerance: Option<f64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_acceleration_mps2: 200.0, // ~20 g, beyond any handheld or vehicle motion
            max_delta_time_s: 5.0,
            rotation_tolerance: None,
        }
    }
}

/// Stateless checks for each sample kind
#[derive(Debug, Clone, Default)]
pub struct SampleValidator {
    config: ValidationConfig,
}

impl SampleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate an earth-frame acceleration sample and its integration step
    pub fn validate_acceleration(
        &self,
        accel: &Vector3<AccelerationUnit>,
        dt: f64,
        now: f64,
    ) -> FusionResult<()> {
        if !accel.is_finite() {
            return Err(FusionError::NonFiniteSample { field: "acceleration" });
        }
        if !now.is_finite() {
            return Err(FusionError::NonFiniteSample { field: "timestamp" });
        }
        if !dt.is_finite() || dt <= 0.0 || dt > self.config.max_delta_time_s {
            return Err(FusionError::InvalidDeltaTime {
                dt,
                max: self.config.max_delta_time_s,
            });
        }

        let magnitude = accel
            .converted(AccelerationUnit::MetersPerSecondSquared)
            .norm()
            .value;
        if magnitude > self.config.max_acceleration_mps2 {
            return Err(FusionError::AccelerationOutOfRange {
                magnitude,
                limit: self.config.max_acceleration_mps2,
            });
        }
        Ok(())
    }

    /// Validate an authoritative position fix
    pub fn validate_fix(&self, fix: &Coordinate) -> FusionResult<()> {
        if !fix.latitude.is_finite() || !fix.longitude.is_finite() {
            return Err(FusionError::NonFiniteSample { field: "coordinate" });
        }
        if !fix.timestamp.is_finite() {
            return Err(FusionError::NonFiniteSample { field: "timestamp" });
        }
        if !(-90.0..=90.0).contains(&fix.latitude) || !(-180.0..=180.0).contains(&fix.longitude) {
            return Err(FusionError::CoordinateOutOfRange {
                latitude: fix.latitude,
                longitude: fix.longitude,
            });
        }
        if let Some(speed) = fix.speed {
            if !speed.is_finite() {
                return Err(FusionError::NonFiniteSample { field: "speed" });
            }
            // Unknown speed is `None`; a negative magnitude would reverse the prior velocity
            if speed.value < 0.0 {
                return Err(FusionError::NegativeSpeed { speed: speed.value });
            }
        }
        if let Some(course) = fix.course {
            if !course.is_finite() {
                return Err(FusionError::NonFiniteSample { field: "course" });
            }
            if !(0.0..360.0).contains(&course) {
                return Err(FusionError::InvalidCourse { course });
            }
        }
        Ok(())
    }

    pub fn validate_heading(&self, heading: f64, now: f64) -> FusionResult<()> {
        if !heading.is_finite() {
            return Err(FusionError::NonFiniteSample { field: "heading" });
        }
        if !now.is_finite() {
            return Err(FusionError::NonFiniteSample { field: "timestamp" });
        }
        if !(0.0..360.0).contains(&heading) {
            return Err(FusionError::InvalidHeading { heading });
        }
        Ok(())
    }

    /// Validate a raw device-motion update before it is rotated
    pub fn validate_motion(&self, motion: &DeviceMotion) -> FusionResult<RotationMatrix> {
        let rotation = RotationMatrix::from_rows(motion.rotation_matrix);
        if !rotation.is_finite() {
            return Err(FusionError::NonFiniteSample { field: "rotation_matrix" });
        }
        if !motion.user_acceleration.is_finite() {
            return Err(FusionError::NonFiniteSample { field: "user_acceleration" });
        }
        if let Some(tolerance) = self.config.rotation_tolerance {
            if !rotation.is_orthonormal(tolerance) {
                return Err(FusionError::RotationNotOrthonormal { tolerance });
            }
        }
        Ok(rotation)
    }
}
