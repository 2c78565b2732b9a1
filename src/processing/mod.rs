//! Sample storage and the fusion engine

pub mod engine;
pub mod sample_log;

pub use engine::{FixState, FusionEngine, FusionState};
pub use sample_log::SampleLog;
