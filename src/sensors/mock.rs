//! Scripted sensor providers for testing and offline replay

use std::collections::VecDeque;

use crate::core::types::{Attitude, DeviceMotion, HeadingFix, LocationFix};
use crate::core::units::AccelerationUnit;
use crate::core::vector::Vector3;
use crate::sensors::error::{SensorError, SensorResult};
use crate::sensors::source::{
    AuthorizationStatus, LocationEvent, LocationSource, MotionSource, SensorKind,
};

const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Motion provider that replays queued updates
#[derive(Debug, Default)]
pub struct MockMotionSource {
    queue: VecDeque<DeviceMotion>,
    active: bool,
    interval_s: Option<f64>,
    start_failure: Option<String>,
    disconnected: bool,
}

impl MockMotionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `start` fail with `reason`
    pub fn fail_on_start(mut self, reason: &str) -> Self {
        self.start_failure = Some(reason.to_string());
        self
    }

    pub fn push(&mut self, motion: DeviceMotion) {
        self.queue.push_back(motion);
    }

    /// Queue a device held level and pointing north with the given body acceleration
    pub fn push_level(&mut self, acceleration: Vector3<AccelerationUnit>, timestamp: f64) {
        self.push(DeviceMotion {
            rotation_matrix: IDENTITY,
            user_acceleration: acceleration,
            attitude: Attitude::default(),
            timestamp,
        });
    }

    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    pub fn interval(&self) -> Option<f64> {
        self.interval_s
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

impl MotionSource for MockMotionSource {
    fn start(&mut self, interval_s: f64) -> SensorResult<()> {
        if let Some(reason) = self.start_failure.take() {
            return Err(SensorError::Unavailable {
                sensor: SensorKind::Motion,
                reason,
            });
        }
        self.interval_s = Some(interval_s);
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn poll(&mut self) -> SensorResult<Option<DeviceMotion>> {
        if self.disconnected {
            return Err(SensorError::Disconnected {
                sensor: SensorKind::Motion,
            });
        }
        if !self.active {
            return Ok(None);
        }
        Ok(self.queue.pop_front())
    }
}

/// Location provider with a scripted permission flow
#[derive(Debug)]
pub struct MockLocationSource {
    status: AuthorizationStatus,
    /// Answer given when authorization is requested
    grant: AuthorizationStatus,
    queue: VecDeque<LocationEvent>,
    updating_location: bool,
    updating_heading: bool,
    authorization_requests: u32,
    location_start_failure: Option<String>,
}

impl MockLocationSource {
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            status,
            grant: AuthorizationStatus::AuthorizedWhenInUse,
            queue: VecDeque::new(),
            updating_location: false,
            updating_heading: false,
            authorization_requests: 0,
            location_start_failure: None,
        }
    }

    pub fn authorized() -> Self {
        Self::new(AuthorizationStatus::AuthorizedWhenInUse)
    }

    /// Status the simulated user picks when prompted
    pub fn answering(mut self, grant: AuthorizationStatus) -> Self {
        self.grant = grant;
        self
    }

    pub fn fail_location_start(mut self, reason: &str) -> Self {
        self.location_start_failure = Some(reason.to_string());
        self
    }

    pub fn push_fix(&mut self, fix: LocationFix) {
        self.queue.push_back(LocationEvent::Fix(fix));
    }

    pub fn push_heading(&mut self, true_heading: f64, timestamp: f64) {
        self.queue.push_back(LocationEvent::Heading(HeadingFix {
            true_heading,
            timestamp,
        }));
    }

    /// Simulate the user changing the permission in system settings
    pub fn change_authorization(&mut self, status: AuthorizationStatus) {
        self.status = status;
        self.queue.push_back(LocationEvent::AuthorizationChanged(status));
    }

    pub fn is_updating_location(&self) -> bool {
        self.updating_location
    }

    pub fn is_updating_heading(&self) -> bool {
        self.updating_heading
    }

    pub fn authorization_requests(&self) -> u32 {
        self.authorization_requests
    }

    fn deliverable(&self, event: &LocationEvent) -> bool {
        match event {
            LocationEvent::Fix(_) => self.updating_location,
            LocationEvent::Heading(_) => self.updating_heading,
            LocationEvent::AuthorizationChanged(_) => true,
        }
    }
}

impl LocationSource for MockLocationSource {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.status
    }

    fn request_authorization(&mut self) {
        self.authorization_requests += 1;
        self.change_authorization(self.grant);
    }

    fn start_updating_location(&mut self) -> SensorResult<()> {
        if !self.status.is_authorized() {
            return Err(SensorError::NotAuthorized {
                status: self.status,
            });
        }
        if let Some(reason) = self.location_start_failure.take() {
            return Err(SensorError::Unavailable {
                sensor: SensorKind::Location,
                reason,
            });
        }
        self.updating_location = true;
        Ok(())
    }

    fn stop_updating_location(&mut self) {
        self.updating_location = false;
    }

    fn start_updating_heading(&mut self) -> SensorResult<()> {
        self.updating_heading = true;
        Ok(())
    }

    fn poll(&mut self) -> SensorResult<Option<LocationEvent>> {
        // Updates produced while a stream was stopped are never delivered
        while let Some(event) = self.queue.pop_front() {
            if self.deliverable(&event) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}
