//! Dead Reckoning Positioning
//!
//! Fuses device-motion acceleration with intermittent GPS fixes to keep a
//! position estimate between fixes. Each acceleration sample is rotated into
//! the earth frame, integrated to a velocity and projected onto a flat-earth
//! latitude/longitude step from the last known location.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod sensors;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{
    Acceleration, AccelerationUnit, Angle, AngleUnit, Coordinate, DeviceMotion, FixSource,
    LocationFix, Measurement, SamplePayload, SampleRecord, SensorSample, Speed, SpeedUnit, Unit,
    Vector3, EARTH_RADIUS_M,
};
pub use crate::algorithms::{DeadReckoning, LongitudeScaling, RotationMatrix};
pub use crate::processing::{FixState, FusionEngine, FusionState, SampleLog};
pub use crate::validation::{FusionError, FusionResult, SampleValidator, ValidationConfig};
pub use crate::sensors::{AuthorizationStatus, LocationSource, MotionSource, SensorError};
pub use crate::utils::{ConfigError, FusionConfig};
pub use crate::api::{DriverStatus, FusionEvent, SampleExporter, SensorDriver};
