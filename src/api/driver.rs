//! Sensor driver
//!
//! Owns the motion and location providers and feeds the fusion engine:
//! validates and rotates device-motion updates, routes GPS and heading
//! fixes, and walks the location permission flow. Provider failures are
//! logged and reported, never fatal; the engine keeps its last known state.

use std::sync::Arc;

use crate::algorithms::orientation::to_earth_frame;
use crate::core::types::{DeviceMotion, LocationFix};
use crate::processing::engine::FusionEngine;
use crate::sensors::error::SensorError;
use crate::sensors::source::{
    AuthorizationStatus, LocationEvent, LocationSource, MotionSource, SensorKind,
};
use crate::utils::config::FusionConfig;
use crate::validation::data::SampleValidator;
use crate::validation::error::FusionResult;

/// Health of the driver's providers
#[derive(Debug, Clone, PartialEq)]
pub struct DriverStatus {
    pub motion_active: bool,
    pub location_updating: bool,
    pub heading_updating: bool,
    pub authorization: AuthorizationStatus,
    /// Most recent provider failure, if any
    pub last_error: Option<SensorError>,
}

/// Counts from one `pump` pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub motion_samples: usize,
    pub location_fixes: usize,
    pub headings: usize,
    pub rejected: usize,
    pub sensor_errors: usize,
}

pub struct SensorDriver<M: MotionSource, L: LocationSource> {
    engine: Arc<FusionEngine>,
    motion: M,
    location: L,
    validator: SampleValidator,
    interval_s: f64,
    heading_enabled: bool,
    tracking_enabled: bool,
    status: DriverStatus,
}

impl<M: MotionSource, L: LocationSource> SensorDriver<M, L> {
    pub fn new(engine: Arc<FusionEngine>, motion: M, location: L, config: &FusionConfig) -> Self {
        let authorization = location.authorization_status();
        Self {
            engine,
            motion,
            location,
            validator: SampleValidator::with_config(config.validation.clone()),
            interval_s: config.motion_update_interval_s,
            heading_enabled: config.heading_updates_enabled,
            tracking_enabled: config.location_tracking_enabled,
            status: DriverStatus {
                motion_active: false,
                location_updating: false,
                heading_updating: false,
                authorization,
                last_error: None,
            },
        }
    }

    pub fn engine(&self) -> &Arc<FusionEngine> {
        &self.engine
    }

    pub fn status(&self) -> &DriverStatus {
        &self.status
    }

    pub fn motion_source(&self) -> &M {
        &self.motion
    }

    pub fn location_source(&self) -> &L {
        &self.location
    }

    /// Start motion and heading updates and act on the current permission
    pub fn start(&mut self) -> &DriverStatus {
        match self.motion.start(self.interval_s) {
            Ok(()) => {
                log::info!("device motion updates started every {} s", self.interval_s);
                self.status.motion_active = true;
            }
            Err(err) => self.record_failure(err),
        }

        if self.heading_enabled {
            match self.location.start_updating_heading() {
                Ok(()) => self.status.heading_updating = true,
                Err(err) => self.record_failure(err),
            }
        }

        let authorization = self.location.authorization_status();
        self.handle_authorization(authorization);
        &self.status
    }

    pub fn stop(&mut self) {
        self.motion.stop();
        self.location.stop_updating_location();
        self.status.motion_active = false;
        self.status.location_updating = false;
    }

    /// React to a permission change
    pub fn handle_authorization(&mut self, status: AuthorizationStatus) {
        log::info!("location authorization is {:?}", status);
        self.status.authorization = status;

        match status {
            AuthorizationStatus::NotDetermined => self.location.request_authorization(),
            AuthorizationStatus::AuthorizedWhenInUse | AuthorizationStatus::AuthorizedAlways => {
                if self.tracking_enabled {
                    self.start_location_updates();
                }
            }
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                log::warn!("location access unavailable; positions rely on dead reckoning only");
                self.location.stop_updating_location();
                self.status.location_updating = false;
            }
        }
    }

    /// Toggle GPS updates; dead reckoning continues either way
    pub fn set_location_tracking(&mut self, enabled: bool) {
        self.tracking_enabled = enabled;
        if enabled {
            if self.status.authorization.is_authorized() {
                self.start_location_updates();
            }
        } else {
            self.location.stop_updating_location();
            self.status.location_updating = false;
            log::info!("location tracking disabled");
        }
    }

    pub fn is_location_tracking(&self) -> bool {
        self.tracking_enabled
    }

    /// Rotate one device-motion update into the earth frame and fuse it
    pub fn process_motion(&self, motion: &DeviceMotion, now: f64) -> FusionResult<()> {
        let rotation = self.validator.validate_motion(motion)?;
        log::debug!(
            "attitude yaw={:.3} pitch={:.3} roll={:.3}",
            motion.attitude.yaw,
            motion.attitude.pitch,
            motion.attitude.roll
        );

        let earth = to_earth_frame(&rotation, &motion.user_acceleration);
        self.engine.append_acceleration_sample(earth, self.interval_s, now)?;
        Ok(())
    }

    pub fn process_location(&self, fix: &LocationFix) -> FusionResult<()> {
        self.engine.append_location_fix(fix.to_coordinate())
    }

    /// Drain every pending update from both providers.
    ///
    /// `now` stamps motion samples, matching the time they are fused.
    pub fn pump(&mut self, now: f64) -> PumpReport {
        let mut report = PumpReport::default();

        // Location before motion: a fix in this pass is the baseline
        loop {
            match self.location.poll() {
                Ok(Some(LocationEvent::Fix(fix))) => match self.process_location(&fix) {
                    Ok(()) => report.location_fixes += 1,
                    Err(_) => report.rejected += 1,
                },
                Ok(Some(LocationEvent::Heading(heading))) => {
                    match self.engine.append_heading(heading.true_heading, heading.timestamp) {
                        Ok(()) => report.headings += 1,
                        Err(_) => report.rejected += 1,
                    }
                }
                Ok(Some(LocationEvent::AuthorizationChanged(status))) => {
                    self.handle_authorization(status)
                }
                Ok(None) => break,
                Err(err) => {
                    report.sensor_errors += 1;
                    self.record_failure(err);
                    break;
                }
            }
        }

        loop {
            match self.motion.poll() {
                Ok(Some(motion)) => match self.process_motion(&motion, now) {
                    Ok(()) => report.motion_samples += 1,
                    Err(err) => {
                        log::warn!("motion sample dropped: {}", err);
                        report.rejected += 1;
                    }
                },
                Ok(None) => break,
                Err(err) => {
                    report.sensor_errors += 1;
                    self.status.motion_active = false;
                    self.record_failure(err);
                    break;
                }
            }
        }

        report
    }

    fn start_location_updates(&mut self) {
        match self.location.start_updating_location() {
            Ok(()) => {
                self.status.location_updating = true;
                log::info!("location updates started");
            }
            Err(err) => self.record_failure(err),
        }
    }

    fn record_failure(&mut self, err: SensorError) {
        match err.sensor() {
            SensorKind::Motion => log::error!("{}; dead reckoning suspended", err),
            SensorKind::Location | SensorKind::Heading => log::error!("{}", err),
        }
        self.status.last_error = Some(err);
    }
}
