//! Three-component quantity sharing a single unit

use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use crate::core::units::{AccelerationUnit, Measurement, SpeedUnit, Unit};

/// Three values measured in the same unit.
///
/// Components are private so a vector can only be built whole; arithmetic
/// always yields a new vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3<U: Unit> {
    x: f64,
    y: f64,
    z: f64,
    unit: U,
}

impl<U: Unit> Vector3<U> {
    pub fn new(x: f64, y: f64, z: f64, unit: U) -> Self {
        Self { x, y, z, unit }
    }

    pub fn zeros(unit: U) -> Self {
        Self::new(0.0, 0.0, 0.0, unit)
    }

    /// Build from three measurements, converting each into the unit of `x`
    pub fn from_measurements(x: Measurement<U>, y: Measurement<U>, z: Measurement<U>) -> Self {
        let unit = x.unit;
        Self::new(x.value, y.value_in(unit), z.value_in(unit), unit)
    }

    pub fn from_nalgebra(v: &na::Vector3<f64>, unit: U) -> Self {
        Self::new(v.x, v.y, v.z, unit)
    }

    pub fn x(&self) -> Measurement<U> {
        Measurement::new(self.x, self.unit)
    }

    pub fn y(&self) -> Measurement<U> {
        Measurement::new(self.y, self.unit)
    }

    pub fn z(&self) -> Measurement<U> {
        Measurement::new(self.z, self.unit)
    }

    pub fn unit(&self) -> U {
        self.unit
    }

    /// Raw components in the vector's own unit
    pub fn components(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn to_nalgebra(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.x, self.y, self.z)
    }

    pub fn converted(&self, unit: U) -> Self {
        if unit == self.unit {
            return *self;
        }
        let scale = self.unit.base_factor() / unit.base_factor();
        Self::new(self.x * scale, self.y * scale, self.z * scale, unit)
    }

    pub fn norm(&self) -> Measurement<U> {
        Measurement::new(self.to_nalgebra().norm(), self.unit)
    }

    /// Magnitude of the x/y components only
    pub fn horizontal_norm(&self) -> Measurement<U> {
        Measurement::new(self.x.hypot(self.y), self.unit)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Vector3<AccelerationUnit> {
    /// Velocity change in m/s from holding this acceleration for `seconds`
    pub fn integrate(&self, seconds: f64) -> Vector3<SpeedUnit> {
        let si = self.converted(AccelerationUnit::MetersPerSecondSquared);
        Vector3::new(
            si.x * seconds,
            si.y * seconds,
            si.z * seconds,
            SpeedUnit::MetersPerSecond,
        )
    }
}

impl<U: Unit> Add for Vector3<U> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let rhs = rhs.converted(self.unit);
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.unit)
    }
}

impl<U: Unit> Sub for Vector3<U> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let rhs = rhs.converted(self.unit);
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.unit)
    }
}

impl<U: Unit> Mul<f64> for Vector3<U> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::STANDARD_GRAVITY;
    use crate::core::units::Speed;
    use approx::assert_relative_eq;

    #[test]
    fn test_componentwise_construction() {
        let v = Vector3::from_measurements(
            Speed::meters_per_second(1.0),
            Speed::new(3.6, SpeedUnit::KilometersPerHour),
            Speed::meters_per_second(0.0),
        );
        assert_eq!(v.unit(), SpeedUnit::MetersPerSecond);
        assert_relative_eq!(v.y().value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_addition_converts_right_operand() {
        let a = Vector3::new(1.0, 0.0, 0.0, SpeedUnit::MetersPerSecond);
        let b = Vector3::new(3.6, 7.2, 0.0, SpeedUnit::KilometersPerHour);
        let sum = a + b;
        assert_relative_eq!(sum.x().value, 2.0, epsilon = 1e-12);
        assert_relative_eq!(sum.y().value, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_integrate_gravity_units() {
        let accel = Vector3::new(1.0, 0.0, -1.0, AccelerationUnit::StandardGravity);
        let dv = accel.integrate(0.1);
        assert_eq!(dv.unit(), SpeedUnit::MetersPerSecond);
        assert_relative_eq!(dv.x().value, STANDARD_GRAVITY * 0.1, epsilon = 1e-12);
        assert_relative_eq!(dv.z().value, -STANDARD_GRAVITY * 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_norms() {
        let v = Vector3::new(3.0, 4.0, 12.0, SpeedUnit::MetersPerSecond);
        assert_relative_eq!(v.horizontal_norm().value, 5.0);
        assert_relative_eq!(v.norm().value, 13.0);
    }

    #[test]
    fn test_non_finite_detection() {
        let v = Vector3::new(f64::NAN, 0.0, 0.0, AccelerationUnit::MetersPerSecondSquared);
        assert!(!v.is_finite());
        assert!(Vector3::zeros(AccelerationUnit::StandardGravity).is_finite());
    }
}
