//! Configuration loading and merging

pub mod file_config;
pub mod loader;

pub use file_config::{BackendConfig, ConfigValidationError, FileConfig, LogConfig};
pub use loader::ConfigLoader;
