//! Provider traits for motion and location data

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{DeviceMotion, HeadingFix, LocationFix};
use crate::sensors::error::SensorResult;

/// Sensor subsystems feeding the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Motion,
    Location,
    Heading,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::Motion => "motion",
            SensorKind::Location => "location",
            SensorKind::Heading => "heading",
        };
        f.write_str(name)
    }
}

/// Location permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedWhenInUse | AuthorizationStatus::AuthorizedAlways
        )
    }
}

/// Events delivered by a location provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationEvent {
    Fix(LocationFix),
    Heading(HeadingFix),
    AuthorizationChanged(AuthorizationStatus),
}

/// Periodic device-motion provider.
///
/// `poll` is non-blocking: `Ok(None)` means no update is pending.
pub trait MotionSource {
    /// Begin delivering updates every `interval_s` seconds
    fn start(&mut self, interval_s: f64) -> SensorResult<()>;

    fn stop(&mut self);

    fn is_active(&self) -> bool;

    fn poll(&mut self) -> SensorResult<Option<DeviceMotion>>;
}

/// GPS and compass provider
pub trait LocationSource {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for when-in-use access; the answer arrives as an event
    fn request_authorization(&mut self);

    fn start_updating_location(&mut self) -> SensorResult<()>;

    fn stop_updating_location(&mut self);

    fn start_updating_heading(&mut self) -> SensorResult<()>;

    fn poll(&mut self) -> SensorResult<Option<LocationEvent>>;
}
