//! Unit-tagged scalar quantities
//!
//! Only the handful of units the fusion pipeline touches are modelled:
//! speed, linear acceleration and plane angle. Each dimension has one base
//! unit (m/s, m/s², radians) that every conversion passes through.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::core::constants::STANDARD_GRAVITY;

/// A unit of measure within a single physical dimension
pub trait Unit: Copy + PartialEq + fmt::Debug {
    /// Base unit of the dimension
    fn base() -> Self;

    /// Multiplier that converts one of this unit into the base unit
    fn base_factor(&self) -> f64;

    /// Short display symbol
    fn symbol(&self) -> &'static str;
}

/// Units of speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
    Knots,
}

impl Unit for SpeedUnit {
    fn base() -> Self {
        SpeedUnit::MetersPerSecond
    }

    fn base_factor(&self) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => 1.0,
            SpeedUnit::KilometersPerHour => 1000.0 / 3600.0,
            SpeedUnit::MilesPerHour => 1609.344 / 3600.0,
            SpeedUnit::Knots => 1852.0 / 3600.0,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            SpeedUnit::MetersPerSecond => "m/s",
            SpeedUnit::KilometersPerHour => "km/h",
            SpeedUnit::MilesPerHour => "mph",
            SpeedUnit::Knots => "kn",
        }
    }
}

/// Units of linear acceleration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelerationUnit {
    MetersPerSecondSquared,
    /// Multiples of standard gravity, as most motion co-processors report
    StandardGravity,
}

impl Unit for AccelerationUnit {
    fn base() -> Self {
        AccelerationUnit::MetersPerSecondSquared
    }

    fn base_factor(&self) -> f64 {
        match self {
            AccelerationUnit::MetersPerSecondSquared => 1.0,
            AccelerationUnit::StandardGravity => STANDARD_GRAVITY,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            AccelerationUnit::MetersPerSecondSquared => "m/s²",
            AccelerationUnit::StandardGravity => "g",
        }
    }
}

/// Units of plane angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleUnit {
    Radians,
    Degrees,
}

impl Unit for AngleUnit {
    fn base() -> Self {
        AngleUnit::Radians
    }

    fn base_factor(&self) -> f64 {
        match self {
            AngleUnit::Radians => 1.0,
            AngleUnit::Degrees => std::f64::consts::PI / 180.0,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            AngleUnit::Radians => "rad",
            AngleUnit::Degrees => "°",
        }
    }
}

/// A scalar value tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement<U: Unit> {
    pub value: f64,
    pub unit: U,
}

pub type Speed = Measurement<SpeedUnit>;
pub type Acceleration = Measurement<AccelerationUnit>;
pub type Angle = Measurement<AngleUnit>;

impl<U: Unit> Measurement<U> {
    pub fn new(value: f64, unit: U) -> Self {
        Self { value, unit }
    }

    /// Value expressed in the base unit of the dimension
    pub fn base_value(&self) -> f64 {
        self.value * self.unit.base_factor()
    }

    /// Value expressed in `unit`
    pub fn value_in(&self, unit: U) -> f64 {
        if unit == self.unit {
            return self.value;
        }
        self.base_value() / unit.base_factor()
    }

    /// Same quantity re-expressed in `unit`
    pub fn converted(&self, unit: U) -> Self {
        Self::new(self.value_in(unit), unit)
    }

    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }
}

impl Speed {
    pub fn meters_per_second(value: f64) -> Self {
        Self::new(value, SpeedUnit::MetersPerSecond)
    }
}

impl Acceleration {
    pub fn meters_per_second_squared(value: f64) -> Self {
        Self::new(value, AccelerationUnit::MetersPerSecondSquared)
    }

    /// Velocity change produced by holding this acceleration for `seconds`
    pub fn over(&self, seconds: f64) -> Speed {
        Speed::meters_per_second(self.base_value() * seconds)
    }
}

impl Angle {
    pub fn degrees(value: f64) -> Self {
        Self::new(value, AngleUnit::Degrees)
    }

    pub fn radians(value: f64) -> Self {
        Self::new(value, AngleUnit::Radians)
    }
}

// Sums and differences keep the left operand's unit
impl<U: Unit> Add for Measurement<U> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.value + rhs.value_in(self.unit), self.unit)
    }
}

impl<U: Unit> Sub for Measurement<U> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.value - rhs.value_in(self.unit), self.unit)
    }
}

impl<U: Unit> Mul<f64> for Measurement<U> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.value * rhs, self.unit)
    }
}

impl<U: Unit> Neg for Measurement<U> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.value, self.unit)
    }
}

impl<U: Unit> fmt::Display for Measurement<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*} {}", precision, self.value, self.unit.symbol()),
            None => write!(f, "{} {}", self.value, self.unit.symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_speed_conversion() {
        let speed = Speed::meters_per_second(10.0);
        assert_relative_eq!(speed.value_in(SpeedUnit::KilometersPerHour), 36.0, epsilon = 1e-12);

        let knots = Speed::new(1.0, SpeedUnit::Knots);
        assert_relative_eq!(knots.base_value(), 0.514444, epsilon = 1e-6);
    }

    #[test]
    fn test_gravity_units_convert_to_si() {
        let accel = Acceleration::new(1.0, AccelerationUnit::StandardGravity);
        assert_relative_eq!(accel.base_value(), STANDARD_GRAVITY);
        assert_relative_eq!(accel.over(0.5).value, STANDARD_GRAVITY * 0.5);
    }

    #[test]
    fn test_angle_conversion() {
        let right = Angle::degrees(90.0);
        assert_relative_eq!(right.value_in(AngleUnit::Radians), std::f64::consts::FRAC_PI_2);
        assert_eq!(right.converted(AngleUnit::Degrees), right);
    }

    #[test]
    fn test_mixed_unit_addition_keeps_left_unit() {
        let sum = Speed::new(36.0, SpeedUnit::KilometersPerHour) + Speed::meters_per_second(10.0);
        assert_eq!(sum.unit, SpeedUnit::KilometersPerHour);
        assert_relative_eq!(sum.value, 72.0, epsilon = 1e-9);

        let diff = Speed::meters_per_second(10.0) - Speed::new(18.0, SpeedUnit::KilometersPerHour);
        assert_relative_eq!(diff.value, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_display_with_precision() {
        let speed = Speed::new(12.3456, SpeedUnit::KilometersPerHour);
        assert_eq!(format!("{:.1}", speed), "12.3 km/h");
    }
}
