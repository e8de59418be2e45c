//! Infrastructure layer for deliberation
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod catalog;
pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use catalog::{CatalogError, CatalogLoader};
pub use config::{
    ConfigLoader, ConfigSource, ConfigValidationError, FileConfig, FileOutputConfig,
    FileOutputFormat,
};
pub use logging::JsonlTraceLogger;
pub use providers::AnthropicEngine;
