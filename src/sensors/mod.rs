//! Sensor collaborator seam
//!
//! The fusion engine never talks to platform APIs directly. Motion and
//! location providers implement the traits in [`source`]; the mocks in
//! [`mock`] replay scripted data for tests and offline runs.

pub mod error;
pub mod mock;
pub mod source;

pub use error::{SensorError, SensorResult};
pub use mock::{MockLocationSource, MockMotionSource};
pub use source::{AuthorizationStatus, LocationEvent, LocationSource, MotionSource, SensorKind};
