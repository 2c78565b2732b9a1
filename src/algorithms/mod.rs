//! Fusion math: frame rotation and dead-reckoning integration

pub mod dead_reckoning;
pub mod orientation;

pub use dead_reckoning::{DeadReckoning, LongitudeScaling};
pub use orientation::{to_earth_frame, RotationMatrix};
