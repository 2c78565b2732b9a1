//! Application-facing surface
//!
//! The sensor driver that wires providers into the fusion engine, listener
//! callbacks for position updates, and export of the sample log.

pub mod callback;
pub mod driver;
pub mod export;

pub use callback::{CallbackHandle, FusionEvent, FusionListener, ListenerRegistry};
pub use driver::{DriverStatus, PumpReport, SensorDriver};
pub use export::{format_speed, SampleExporter};
