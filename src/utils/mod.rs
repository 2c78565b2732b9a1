//! Configuration utilities

pub mod config;

pub use config::{ConfigError, FusionConfig};
