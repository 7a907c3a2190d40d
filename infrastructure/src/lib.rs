//! Infrastructure layer for agent-crew
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod generation;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileGenerationConfig, FileLoggingConfig,
    FileOrchestrationConfig, FileOutputConfig, FileOutputFormat,
};
pub use generation::CompletionsClient;
pub use logging::JsonlPipelineLogger;
pub use store::InMemoryStateStore;
