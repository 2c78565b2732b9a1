//! Dead-reckoning integrator
//!
//! Advances a known coordinate by one earth-frame acceleration sample:
//! - acceleration is relabeled from the (north, ·, up) sensor frame into the
//!   engine's (east, north, up) axes
//! - the prior velocity is rebuilt from speed and course
//! - velocity is integrated with a single Euler step
//! - position is propagated with a local flat-earth approximation

use serde::{Deserialize, Serialize};

use crate::core::constants::EARTH_RADIUS_M;
use crate::core::types::Coordinate;
use crate::core::units::{AccelerationUnit, Speed, SpeedUnit};
use crate::core::vector::Vector3;

/// Below this the meridian convergence makes the longitude step meaningless
const MIN_LONGITUDE_SCALE: f64 = 1e-12;

/// Angle whose cosine scales the east displacement into a longitude delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongitudeScaling {
    /// cos(latitude), geodesically correct
    Latitude,
    /// cos(longitude), reproduces legacy tracks recorded with this scaling
    Longitude,
}

impl Default for LongitudeScaling {
    fn default() -> Self {
        LongitudeScaling::Latitude
    }
}

/// Relabel an earth-frame vector into engine axes.
///
/// The sensor's earth frame has X toward true north; the engine wants Y
/// north and X east, so X and Y are swapped. This is a fixed part of the
/// pipeline, not an option.
pub fn to_engine_axes(earth: &Vector3<AccelerationUnit>) -> Vector3<AccelerationUnit> {
    let [north, east, up] = earth.components();
    Vector3::new(east, north, up, earth.unit())
}

/// Course in degrees clockwise from north for an (east, north) velocity.
///
/// Returns `None` for a zero velocity, which has no direction.
pub fn course_from_velocity(velocity: &Vector3<SpeedUnit>) -> Option<f64> {
    let [east, north, _] = velocity.components();
    if east == 0.0 && north == 0.0 {
        return None;
    }
    Some(east.atan2(north).to_degrees().rem_euclid(360.0))
}

/// Wrap a longitude into [-180, 180)
pub fn wrap_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

/// Single-step dead-reckoning propagator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadReckoning {
    earth_radius_m: f64,
    longitude_scaling: LongitudeScaling,
    wrap_longitude: bool,
}

impl Default for DeadReckoning {
    fn default() -> Self {
        Self {
            earth_radius_m: EARTH_RADIUS_M,
            longitude_scaling: LongitudeScaling::default(),
            wrap_longitude: false,
        }
    }
}

impl DeadReckoning {
    pub fn new(earth_radius_m: f64, longitude_scaling: LongitudeScaling) -> Self {
        Self {
            earth_radius_m,
            longitude_scaling,
            ..Default::default()
        }
    }

    pub fn with_longitude_wrap(mut self, wrap: bool) -> Self {
        self.wrap_longitude = wrap;
        self
    }

    pub fn longitude_scaling(&self) -> LongitudeScaling {
        self.longitude_scaling
    }

    /// Prior (east, north, 0) velocity in m/s.
    ///
    /// Zero unless both speed and course of `prev` are known.
    pub fn prior_velocity(prev: &Coordinate) -> Vector3<SpeedUnit> {
        match (prev.speed, prev.course) {
            (Some(speed), Some(course_deg)) => {
                let speed = speed.value_in(SpeedUnit::MetersPerSecond);
                let (sin, cos) = course_deg.to_radians().sin_cos();
                Vector3::new(speed * sin, speed * cos, 0.0, SpeedUnit::MetersPerSecond)
            }
            _ => Vector3::zeros(SpeedUnit::MetersPerSecond),
        }
    }

    /// Advance `prev` by one acceleration sample held for `dt` seconds.
    ///
    /// `earth_accel` is in the sensor's earth frame (X north). The caller
    /// guarantees `dt > 0` and finite inputs; the engine validates both.
    pub fn integrate(
        &self,
        prev: &Coordinate,
        earth_accel: &Vector3<AccelerationUnit>,
        dt: f64,
        now: f64,
    ) -> (Speed, Coordinate) {
        let accel = to_engine_axes(earth_accel);
        let velocity = Self::prior_velocity(prev) + accel.integrate(dt);

        // Vertical velocity does not contribute to ground speed
        let speed = Speed::meters_per_second(velocity.horizontal_norm().value);
        let course = course_from_velocity(&velocity);

        let [east, north, _] = velocity.components();
        let (latitude, longitude) = self.propagate(prev, east * dt, north * dt);

        log::debug!(
            "dead reckoning: speed {:.3}, course {:?}, lat {:.7}, lon {:.7}",
            speed,
            course,
            latitude,
            longitude
        );

        let coordinate = Coordinate {
            latitude,
            longitude,
            speed: Some(speed),
            course,
            timestamp: now,
        };
        (speed, coordinate)
    }

    /// Flat-earth displacement of `prev` by meters east and north
    fn propagate(&self, prev: &Coordinate, east_m: f64, north_m: f64) -> (f64, f64) {
        let delta_lat = (north_m / self.earth_radius_m).to_degrees();

        let scale_angle = match self.longitude_scaling {
            LongitudeScaling::Latitude => prev.latitude,
            LongitudeScaling::Longitude => prev.longitude,
        };
        let scale = self.earth_radius_m * scale_angle.to_radians().cos();
        let delta_lon = if scale.abs() < MIN_LONGITUDE_SCALE * self.earth_radius_m {
            0.0
        } else {
            (east_m / scale).to_degrees()
        };

        let latitude = prev.latitude + delta_lat;
        let mut longitude = prev.longitude + delta_lon;
        if self.wrap_longitude {
            longitude = wrap_longitude(longitude);
        }
        (latitude, longitude)
    }
}
