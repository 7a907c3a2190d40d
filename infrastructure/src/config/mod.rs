//! Configuration file loading for agent-crew
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CREW_` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./crew.toml` or `./.crew.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/agent-crew/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileGenerationConfig, FileLoggingConfig,
    FileOrchestrationConfig, FileOutputConfig, FileOutputFormat,
};
pub use loader::ConfigLoader;
