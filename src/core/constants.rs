//! Physical constants and pipeline defaults

/// Earth radius used by the flat-earth propagation step (meters, WGS84 semi-major axis)
pub const EARTH_RADIUS_M: f64 = 6378137.0;

/// Standard gravity (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Default device-motion update period (seconds)
pub const DEFAULT_MOTION_INTERVAL_S: f64 = 0.1;

/// Default cap on retained samples, one hour at the default motion rate
pub const DEFAULT_MAX_LOGGED_SAMPLES: usize = 36_000;
