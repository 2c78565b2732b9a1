//! Sample validation and error types

pub mod data;
pub mod error;

pub use data::{SampleValidator, ValidationConfig};
pub use error::{FusionError, FusionResult};
