//! Core types and constants for the sensor fusion pipeline

pub mod constants;
pub mod types;
pub mod units;
pub mod vector;

pub use constants::*;
pub use types::*;
pub use units::{
    Acceleration, AccelerationUnit, Angle, AngleUnit, Measurement, Speed, SpeedUnit, Unit,
};
pub use vector::Vector3;
