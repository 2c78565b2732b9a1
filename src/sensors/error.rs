//! Sensor collaborator error types

use thiserror::Error;

use crate::sensors::source::{AuthorizationStatus, SensorKind};

/// Failures reported by motion and location providers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    /// The subsystem could not be started or has no hardware
    #[error("{sensor} sensor unavailable: {reason}")]
    Unavailable { sensor: SensorKind, reason: String },

    /// Location access was refused by the user or by policy
    #[error("location access not authorized ({status:?})")]
    NotAuthorized { status: AuthorizationStatus },

    /// The provider stopped delivering after a successful start
    #[error("{sensor} sensor disconnected")]
    Disconnected { sensor: SensorKind },
}

impl SensorError {
    pub fn sensor(&self) -> SensorKind {
        match self {
            SensorError::Unavailable { sensor, .. } | SensorError::Disconnected { sensor } => {
                *sensor
            }
            SensorError::NotAuthorized { .. } => SensorKind::Location,
        }
    }
}

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;
