//! Error types for the fusion engine
//!
//! Nothing here is fatal: a rejected sample leaves the last known state in
//! place and the pipeline carries on with the next one.

use thiserror::Error;

use crate::sensors::error::SensorError;

/// Errors raised while validating, fusing or exporting samples
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("non-finite value in {field}")]
    NonFiniteSample { field: &'static str },

    #[error("invalid integration step of {dt} s (must be in (0, {max}] s)")]
    InvalidDeltaTime { dt: f64, max: f64 },

    #[error("acceleration magnitude {magnitude:.2} m/s² exceeds {limit:.2} m/s²")]
    AccelerationOutOfRange { magnitude: f64, limit: f64 },

    #[error("coordinate out of range: lat={latitude}, lon={longitude}")]
    CoordinateOutOfRange { latitude: f64, longitude: f64 },

    #[error("heading {heading}° outside [0, 360)")]
    InvalidHeading { heading: f64 },

    #[error("fix speed {speed} m/s is negative")]
    NegativeSpeed { speed: f64 },

    #[error("fix course {course}° outside [0, 360)")]
    InvalidCourse { course: f64 },

    #[error("rotation matrix is not orthonormal (tolerance {tolerance})")]
    RotationNotOrthonormal { tolerance: f64 },

    #[error("sample record must carry exactly one payload, found {populated}")]
    MalformedRecord { populated: usize },

    #[error("no listener registered under handle {handle}")]
    UnknownListener { handle: u32 },

    #[error("export line {line}: {source}")]
    Export {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Sensor(#[from] SensorError),
}

impl FusionError {
    /// True when the error describes a single bad sample that was dropped
    pub fn is_rejected_sample(&self) -> bool {
        matches!(
            self,
            FusionError::NonFiniteSample { .. }
                | FusionError::InvalidDeltaTime { .. }
                | FusionError::AccelerationOutOfRange { .. }
                | FusionError::CoordinateOutOfRange { .. }
                | FusionError::InvalidHeading { .. }
                | FusionError::NegativeSpeed { .. }
                | FusionError::InvalidCourse { .. }
                | FusionError::RotationNotOrthonormal { .. }
        )
    }
}

/// Result type for fusion operations
pub type FusionResult<T> = Result<T, FusionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorKind;

    #[test]
    fn test_display_messages() {
        let err = FusionError::InvalidDeltaTime { dt: -0.1, max: 5.0 };
        assert_eq!(err.to_string(), "invalid integration step of -0.1 s (must be in (0, 5] s)");

        let err = FusionError::MalformedRecord { populated: 2 };
        assert!(err.to_string().contains("exactly one payload"));
    }

    #[test]
    fn test_sensor_errors_are_not_sample_rejections() {
        let err: FusionError = SensorError::Unavailable {
            sensor: SensorKind::Motion,
            reason: "no gyroscope".to_string(),
        }
        .into();
        assert!(!err.is_rejected_sample());
        assert!(FusionError::NonFiniteSample { field: "acceleration" }.is_rejected_sample());
    }
}
