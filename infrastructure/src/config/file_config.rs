//! Raw TOML configuration data types
//!
//! These structs mirror the structure of the TOML config file. Every section
//! is `#[serde(default)]`, so a partial file only overrides what it names.

use crew_application::{MAX_TASKS, OrchestrationConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("generation.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("generation.model cannot be empty")]
    EmptyModelName,

    #[error("generation.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("generation.temperature must be between 0 and 2, got {0}")]
    InvalidTemperature(f32),

    #[error("orchestration.{0} must be at least 1")]
    ZeroLimit(&'static str),

    #[error("orchestration.max_tasks cannot exceed {MAX_TASKS}, got {0}")]
    TooManyTasks(usize),
}

/// Text-generation backend settings (`[generation]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Base URL of the completions API, without the `/completions` suffix
    pub base_url: String,
    pub model: String,
    /// Bearer token; usually supplied via `CREW_GENERATION__API_KEY`
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/v1".to_string(),
            model: "default".to_string(),
            api_key: None,
            max_tokens: 2000,
            temperature: 0.7,
            timeout_seconds: 60,
        }
    }
}

/// Pipeline limits (`[orchestration]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    pub max_rounds: usize,
    pub agent_count: usize,
    pub max_concurrency: usize,
    pub context_window: usize,
    pub max_tasks: usize,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        let defaults = OrchestrationConfig::default();
        Self {
            max_rounds: defaults.max_rounds,
            agent_count: defaults.default_agent_count,
            max_concurrency: defaults.max_concurrency,
            context_window: defaults.context_window,
            max_tasks: defaults.max_tasks,
        }
    }
}

impl FileOrchestrationConfig {
    pub fn to_orchestration_config(&self) -> OrchestrationConfig {
        OrchestrationConfig::default()
            .with_max_rounds(self.max_rounds)
            .with_default_agent_count(self.agent_count)
            .with_max_concurrency(self.max_concurrency)
            .with_context_window(self.context_window)
            .with_max_tasks(self.max_tasks)
    }
}

/// How results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutputFormat {
    /// Team, discussion, consensus and plan
    #[default]
    Full,
    /// Only the plan
    Plan,
    /// Machine-readable JSON
    Json,
}

/// Output settings (`[output]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: Option<FileOutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Transcript settings (`[logging]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving opinions, consensus, plans and task results
    pub transcript_file: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub generation: FileGenerationConfig,
    pub orchestration: FileOrchestrationConfig,
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let generation = &self.generation;
        if generation.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if generation.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if generation.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(ConfigValidationError::InvalidTemperature(
                generation.temperature,
            ));
        }

        let orchestration = &self.orchestration;
        for (name, value) in [
            ("max_rounds", orchestration.max_rounds),
            ("agent_count", orchestration.agent_count),
            ("max_concurrency", orchestration.max_concurrency),
            ("max_tasks", orchestration.max_tasks),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::ZeroLimit(name));
            }
        }
        if orchestration.max_tasks > MAX_TASKS {
            return Err(ConfigValidationError::TooManyTasks(orchestration.max_tasks));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[generation]
base_url = "https://api.example.com/v1"
model = "crew-large"
api_key = "secret"
max_tokens = 1000
temperature = 0.2
timeout_seconds = 30

[orchestration]
max_rounds = 5
agent_count = 4
max_concurrency = 2

[output]
format = "json"
color = false

[logging]
transcript_file = "crew.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generation.model, "crew-large");
        assert_eq!(config.generation.api_key.as_deref(), Some("secret"));
        assert_eq!(config.generation.timeout_seconds, 30);
        assert_eq!(config.orchestration.max_rounds, 5);
        assert_eq!(config.orchestration.max_concurrency, 2);
        // Unset keys keep their defaults
        assert_eq!(config.orchestration.max_tasks, 6);
        assert_eq!(config.output.format, Some(FileOutputFormat::Json));
        assert!(!config.output.color);
        assert_eq!(config.logging.transcript_file.as_deref(), Some("crew.jsonl"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.generation.max_tokens, 2000);
        assert_eq!(config.generation.timeout_seconds, 60);
        assert_eq!(config.orchestration.agent_count, 3);
        assert!(config.output.color);
        assert!(config.logging.transcript_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config: FileConfig = toml::from_str("[generation]\ntimeout_seconds = 0").unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));
    }

    #[test]
    fn test_validate_empty_model() {
        let config: FileConfig = toml::from_str("[generation]\nmodel = \"  \"").unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyModelName));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let config: FileConfig = toml::from_str("[orchestration]\nmax_concurrency = 0").unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroLimit("max_concurrency"))
        );
    }

    #[test]
    fn test_validate_too_many_tasks() {
        let config: FileConfig = toml::from_str("[orchestration]\nmax_tasks = 20").unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::TooManyTasks(20))
        );
    }

    #[test]
    fn test_to_orchestration_config() {
        let config: FileConfig =
            toml::from_str("[orchestration]\nmax_rounds = 4\ncontext_window = 5").unwrap();
        let orchestration = config.orchestration.to_orchestration_config();
        assert_eq!(orchestration.max_rounds, 4);
        assert_eq!(orchestration.context_window, 5);
        assert_eq!(orchestration.default_agent_count, 3);
    }
}
