//! Thread-safe fusion engine
//!
//! Acceleration samples arrive on the motion timer while GPS and heading
//! fixes arrive on the location provider's context. All state lives behind
//! one mutex, and every append (read previous baseline, integrate, store,
//! log) happens inside a single critical section. Listeners are notified
//! after the lock is released.

use parking_lot::Mutex;

use crate::algorithms::dead_reckoning::DeadReckoning;
use crate::api::callback::{CallbackHandle, FusionEvent, FusionListener, ListenerRegistry};
use crate::core::types::{Coordinate, FixSource, SampleRecord, SensorSample};
use crate::core::units::{AccelerationUnit, Speed};
use crate::core::vector::Vector3;
use crate::processing::sample_log::SampleLog;
use crate::utils::config::{ConfigError, FusionConfig};
use crate::validation::data::SampleValidator;
use crate::validation::error::{FusionError, FusionResult};

/// GPS baseline lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixState {
    /// No GPS fix yet; acceleration is logged but not integrated
    NoFix,
    /// At least one fix received; there is no way back to `NoFix`
    HasFix,
}

/// Snapshot of the engine's fused state
#[derive(Debug, Clone, PartialEq)]
pub struct FusionState {
    pub last_known_location: Option<Coordinate>,
    pub last_known_heading: Option<f64>,
    pub current_speed: Option<Speed>,
    pub fix_state: FixState,
    /// Samples dropped by validation since the engine was created
    pub rejected_samples: u64,
}

impl Default for FusionState {
    fn default() -> Self {
        Self {
            last_known_location: None,
            last_known_heading: None,
            current_speed: None,
            fix_state: FixState::NoFix,
            rejected_samples: 0,
        }
    }
}

#[derive(Debug)]
struct EngineInner {
    state: FusionState,
    log: SampleLog,
}

/// Dead-reckoning fusion engine, shared between sensor contexts via `Arc`
#[derive(Debug)]
pub struct FusionEngine {
    inner: Mutex<EngineInner>,
    listeners: ListenerRegistry,
    reckoner: DeadReckoning,
    validator: SampleValidator,
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::build(&FusionConfig::default())
    }
}

impl FusionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine for a validated configuration.
    ///
    /// A radius, interval or log capacity that would poison the position
    /// state is refused here rather than surfacing as an infinite coordinate.
    pub fn with_config(config: &FusionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &FusionConfig) -> Self {
        let reckoner = DeadReckoning::new(config.earth_radius_m, config.longitude_scaling)
            .with_longitude_wrap(config.wrap_longitude);

        Self {
            inner: Mutex::new(EngineInner {
                state: FusionState::default(),
                log: SampleLog::with_capacity(config.max_logged_samples),
            }),
            listeners: ListenerRegistry::new(),
            reckoner,
            validator: SampleValidator::with_config(config.validation.clone()),
        }
    }

    /// Log an earth-frame acceleration sample held for `dt` seconds.
    ///
    /// With a baseline, the sample is integrated and the dead-reckoned
    /// coordinate becomes the new baseline and is returned. Without one the
    /// raw acceleration is logged and `None` is returned.
    pub fn append_acceleration_sample(
        &self,
        accel: Vector3<AccelerationUnit>,
        dt: f64,
        now: f64,
    ) -> FusionResult<Option<Coordinate>> {
        if let Err(err) = self.validator.validate_acceleration(&accel, dt, now) {
            return Err(self.reject(err));
        }

        let event = {
            let mut inner = self.inner.lock();
            match inner.state.last_known_location {
                Some(prev) => {
                    let (speed, coordinate) = self.reckoner.integrate(&prev, &accel, dt, now);
                    inner.state.current_speed = Some(speed);
                    inner.state.last_known_location = Some(coordinate);
                    inner
                        .log
                        .push(SensorSample::location(now, coordinate, FixSource::DeadReckoning));
                    FusionEvent::PositionUpdated {
                        coordinate,
                        source: FixSource::DeadReckoning,
                    }
                }
                None => {
                    inner.log.push(SensorSample::acceleration(now, accel));
                    FusionEvent::AccelerationBuffered { timestamp: now }
                }
            }
        };

        self.listeners.notify(&event);
        match event {
            FusionEvent::PositionUpdated { coordinate, .. } => Ok(Some(coordinate)),
            _ => Ok(None),
        }
    }

    /// Replace the baseline with an authoritative GPS fix
    pub fn append_location_fix(&self, fix: Coordinate) -> FusionResult<()> {
        if let Err(err) = self.validator.validate_fix(&fix) {
            return Err(self.reject(err));
        }

        {
            let mut inner = self.inner.lock();
            if inner.state.fix_state == FixState::NoFix {
                log::info!(
                    "first GPS fix at lat={:.6}, lon={:.6}; dead reckoning enabled",
                    fix.latitude,
                    fix.longitude
                );
                inner.state.fix_state = FixState::HasFix;
            }
            inner.state.last_known_location = Some(fix);
            inner.state.current_speed = fix.speed;
            inner.log.push(SensorSample::location(fix.timestamp, fix, FixSource::Gps));
        }

        self.listeners.notify(&FusionEvent::PositionUpdated {
            coordinate: fix,
            source: FixSource::Gps,
        });
        Ok(())
    }

    /// Record a true heading. Headings are logged but do not steer integration.
    pub fn append_heading(&self, heading: f64, now: f64) -> FusionResult<()> {
        if let Err(err) = self.validator.validate_heading(heading, now) {
            return Err(self.reject(err));
        }

        {
            let mut inner = self.inner.lock();
            inner.state.last_known_heading = Some(heading);
            inner.log.push(SensorSample::heading(now, heading));
        }

        self.listeners.notify(&FusionEvent::HeadingUpdated {
            heading,
            timestamp: now,
        });
        Ok(())
    }

    /// Position of the most recent sample carrying a location
    pub fn latest_position(&self) -> Option<Coordinate> {
        self.inner.lock().log.latest_location().copied()
    }

    pub fn latest_speed(&self) -> Option<Speed> {
        self.inner.lock().state.current_speed
    }

    pub fn last_known_heading(&self) -> Option<f64> {
        self.inner.lock().state.last_known_heading
    }

    pub fn fix_state(&self) -> FixState {
        self.inner.lock().state.fix_state
    }

    pub fn snapshot(&self) -> FusionState {
        self.inner.lock().state.clone()
    }

    /// Copy of the retained samples, oldest first
    pub fn samples(&self) -> Vec<SensorSample> {
        self.inner.lock().log.iter().copied().collect()
    }

    pub fn records(&self) -> Vec<SampleRecord> {
        self.inner.lock().log.records()
    }

    pub fn sample_count(&self) -> usize {
        self.inner.lock().log.len()
    }

    pub fn register_listener(&self, listener: FusionListener) -> CallbackHandle {
        self.listeners.register(listener)
    }

    pub fn unregister_listener(&self, handle: CallbackHandle) -> FusionResult<()> {
        self.listeners.unregister(handle)
    }

    fn reject(&self, err: FusionError) -> FusionError {
        self.inner.lock().state.rejected_samples += 1;
        log::warn!("dropping sample: {}", err);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::EARTH_RADIUS_M;
    use crate::core::types::SamplePayload;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn mps2(x: f64, y: f64, z: f64) -> Vector3<AccelerationUnit> {
        Vector3::new(x, y, z, AccelerationUnit::MetersPerSecondSquared)
    }

    fn fix(latitude: f64, longitude: f64, timestamp: f64) -> Coordinate {
        Coordinate::new(latitude, longitude, timestamp)
            .with_speed(Speed::meters_per_second(0.0))
            .with_course(0.0)
    }

    #[test]
    fn test_acceleration_without_fix_is_buffered() {
        let engine = FusionEngine::new();
        let result = engine.append_acceleration_sample(mps2(1.0, 0.0, 0.0), 0.1, 1.0).unwrap();
        assert!(result.is_none());
        assert_eq!(engine.fix_state(), FixState::NoFix);
        assert!(engine.latest_position().is_none());
        assert!(engine.latest_speed().is_none());

        let samples = engine.samples();
        assert_eq!(samples.len(), 1);
        assert!(matches!(samples[0].payload, SamplePayload::Acceleration(_)));
    }

    #[test]
    fn test_first_fix_enables_integration() {
        let engine = FusionEngine::new();
        engine.append_location_fix(fix(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(engine.fix_state(), FixState::HasFix);

        let next = engine
            .append_acceleration_sample(mps2(1.0, 0.0, 0.0), 1.0, 1.0)
            .unwrap()
            .unwrap();
        assert_relative_eq!(next.latitude, (1.0 / EARTH_RADIUS_M).to_degrees(), epsilon = 1e-15);
        assert_eq!(next.longitude, 0.0);
        assert_relative_eq!(engine.latest_speed().unwrap().value, 1.0, epsilon = 1e-12);
        assert_eq!(engine.latest_position(), Some(next));
    }

    #[test]
    fn test_integration_chains_from_previous_result() {
        let engine = FusionEngine::new();
        engine.append_location_fix(fix(0.0, 0.0, 0.0)).unwrap();
        engine.append_acceleration_sample(mps2(1.0, 0.0, 0.0), 1.0, 1.0).unwrap();
        let second = engine
            .append_acceleration_sample(mps2(0.0, 0.0, 0.0), 1.0, 2.0)
            .unwrap()
            .unwrap();

        // Coasting at 1 m/s adds a second meter north
        assert_relative_eq!(second.latitude, (2.0 / EARTH_RADIUS_M).to_degrees(), epsilon = 1e-15);
        assert_relative_eq!(second.speed.unwrap().value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_fix_speed_is_treated_as_rest() {
        let engine = FusionEngine::new();
        engine.append_location_fix(Coordinate::new(10.0, 10.0, 0.0)).unwrap();
        assert!(engine.latest_speed().is_none());

        let next = engine
            .append_acceleration_sample(mps2(0.0, 2.0, 0.0), 0.1, 0.1)
            .unwrap()
            .unwrap();
        // Prior velocity zero, so velocity is exactly a·dt (east 0.2 m/s)
        assert_relative_eq!(next.speed.unwrap().value, 0.2, epsilon = 1e-12);
        assert_relative_eq!(next.course.unwrap(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_second_fix_resets_baseline() {
        let engine = FusionEngine::new();
        engine.append_location_fix(fix(10.0, 20.0, 0.0)).unwrap();
        engine.append_acceleration_sample(mps2(3.0, 1.0, 0.0), 0.1, 0.1).unwrap();
        engine.append_location_fix(fix(-33.0, 151.0, 0.2)).unwrap();

        let after = engine
            .append_acceleration_sample(mps2(0.0, 0.0, 0.0), 0.1, 0.3)
            .unwrap()
            .unwrap();
        assert_eq!(after.latitude, -33.0);
        assert_eq!(after.longitude, 151.0);
        assert_eq!(after.speed.unwrap().value, 0.0);
    }

    #[test]
    fn test_repeated_identical_fix_causes_no_drift() {
        let once = FusionEngine::new();
        once.append_location_fix(fix(51.5, -0.12, 0.0)).unwrap();
        let a = once.append_acceleration_sample(mps2(0.5, 0.25, 0.0), 0.1, 0.1).unwrap();

        let twice = FusionEngine::new();
        twice.append_location_fix(fix(51.5, -0.12, 0.0)).unwrap();
        twice.append_location_fix(fix(51.5, -0.12, 0.0)).unwrap();
        let b = twice.append_acceleration_sample(mps2(0.5, 0.25, 0.0), 0.1, 0.1).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_heading_is_recorded_but_not_integrated() {
        let engine = FusionEngine::new();
        engine.append_location_fix(fix(0.0, 0.0, 0.0)).unwrap();
        let without = engine.append_acceleration_sample(mps2(1.0, 0.0, 0.0), 0.1, 0.1).unwrap();

        let engine = FusionEngine::new();
        engine.append_location_fix(fix(0.0, 0.0, 0.0)).unwrap();
        engine.append_heading(270.0, 0.05).unwrap();
        let with = engine.append_acceleration_sample(mps2(1.0, 0.0, 0.0), 0.1, 0.1).unwrap();

        assert_eq!(engine.last_known_heading(), Some(270.0));
        assert_eq!(with, without);
        // Heading samples do not move the latest position
        assert_eq!(engine.latest_position(), with);
    }

    #[test]
    fn test_rejected_sample_leaves_state_untouched() {
        let engine = FusionEngine::new();
        engine.append_location_fix(fix(1.0, 1.0, 0.0)).unwrap();
        let before = engine.snapshot();

        let err = engine
            .append_acceleration_sample(mps2(f64::NAN, 0.0, 0.0), 0.1, 0.1)
            .unwrap_err();
        assert!(err.is_rejected_sample());
        assert!(engine.append_location_fix(Coordinate::new(120.0, 0.0, 1.0)).is_err());
        assert!(engine.append_heading(400.0, 1.0).is_err());

        let after = engine.snapshot();
        assert_eq!(after.last_known_location, before.last_known_location);
        assert_eq!(after.rejected_samples, 3);
        assert_eq!(engine.sample_count(), 1);
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let flat = FusionConfig {
            earth_radius_m: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            FusionEngine::with_config(&flat),
            Err(ConfigError::InvalidParameter { parameter: "earth_radius_m", .. })
        ));
    }

    #[test]
    fn test_negative_fix_speed_is_rejected() {
        let engine = FusionEngine::new();
        let reversed = Coordinate::new(0.0, 0.0, 0.0)
            .with_speed(Speed::meters_per_second(-1.0))
            .with_course(0.0);
        let err = engine.append_location_fix(reversed).unwrap_err();
        assert!(err.is_rejected_sample());
        assert_eq!(engine.fix_state(), FixState::NoFix);
        assert!(engine.latest_position().is_none());

        // A later valid fix at rest stays put under zero acceleration
        engine.append_location_fix(fix(0.0, 0.0, 0.0)).unwrap();
        let next = engine
            .append_acceleration_sample(mps2(0.0, 0.0, 0.0), 1.0, 1.0)
            .unwrap()
            .unwrap();
        assert_eq!(next.latitude, 0.0);
        assert_eq!(next.speed.unwrap().value, 0.0);
    }

    #[test]
    fn test_bounded_log_keeps_latest_position() {
        let config = FusionConfig {
            max_logged_samples: Some(3),
            ..Default::default()
        };
        let engine = FusionEngine::with_config(&config).unwrap();
        engine.append_location_fix(fix(5.0, 5.0, 0.0)).unwrap();
        for i in 0..5 {
            engine.append_heading(10.0 * i as f64, i as f64).unwrap();
        }
        assert_eq!(engine.sample_count(), 3);
        assert_eq!(engine.latest_position().unwrap().latitude, 5.0);
    }

    #[test]
    fn test_listeners_fire_once_after_commit() {
        let engine = Arc::new(FusionEngine::new());
        let positions = Arc::new(AtomicUsize::new(0));
        let buffered = Arc::new(AtomicUsize::new(0));

        let observed = Arc::clone(&engine);
        let p = Arc::clone(&positions);
        let b = Arc::clone(&buffered);
        engine.register_listener(Box::new(move |event| match event {
            FusionEvent::PositionUpdated { coordinate, .. } => {
                // The committed state is already visible to readers
                assert_eq!(observed.latest_position(), Some(*coordinate));
                p.fetch_add(1, Ordering::SeqCst);
            }
            FusionEvent::AccelerationBuffered { .. } => {
                b.fetch_add(1, Ordering::SeqCst);
            }
            FusionEvent::HeadingUpdated { .. } => {}
        }));

        engine.append_acceleration_sample(mps2(0.1, 0.0, 0.0), 0.1, 0.0).unwrap();
        engine.append_location_fix(fix(0.0, 0.0, 0.1)).unwrap();
        engine.append_acceleration_sample(mps2(0.1, 0.0, 0.0), 0.1, 0.2).unwrap();
        let _ = engine.append_acceleration_sample(mps2(0.1, 0.0, 0.0), -1.0, 0.3);

        assert_eq!(buffered.load(Ordering::SeqCst), 1);
        assert_eq!(positions.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_appends_are_not_torn() {
        let engine = Arc::new(
            FusionEngine::with_config(&FusionConfig {
                max_logged_samples: None,
                ..Default::default()
            })
            .unwrap(),
        );
        engine.append_location_fix(fix(0.0, 0.0, 0.0)).unwrap();

        let motion = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..500 {
                    engine
                        .append_acceleration_sample(mps2(0.01, 0.01, 0.0), 0.1, i as f64 * 0.1)
                        .unwrap();
                }
            })
        };
        let location = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..100 {
                    engine.append_location_fix(fix(0.001 * i as f64, 0.0, i as f64)).unwrap();
                    engine.append_heading((i % 360) as f64, i as f64).unwrap();
                }
            })
        };
        motion.join().unwrap();
        location.join().unwrap();

        assert_eq!(engine.sample_count(), 1 + 500 + 200);
        let samples = engine.samples();
        let last_location = samples.iter().rev().find_map(|s| s.coordinate()).copied();
        assert_eq!(engine.latest_position(), last_location);
        assert!(samples
            .iter()
            .filter_map(|s| s.coordinate())
            .all(|c| c.latitude.is_finite() && c.longitude.is_finite()));
    }
}
