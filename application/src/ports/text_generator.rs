//! Text generation port
//!
//! Defines the interface for the external completion backend every stage
//! of the pipeline talks to.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while generating text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Outcome of one generation call.
///
/// Failures are values, not errors: `success == false` means "no usable
/// text" whatever the cause, and `error` says why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub text: String,
    pub tokens: u64,
    pub success: bool,
    pub error: Option<String>,
}

impl Generation {
    pub fn success(text: impl Into<String>, tokens: u64) -> Self {
        Self {
            text: text.into(),
            tokens,
            success: true,
            error: None,
        }
    }

    pub fn failure(error: &GenerationError) -> Self {
        Self {
            text: String::new(),
            tokens: 0,
            success: false,
            error: Some(error.to_string()),
        }
    }

    /// The generated text, or `None` when generation failed
    pub fn into_text(self) -> Option<String> {
        self.success.then_some(self.text)
    }
}

impl From<Result<(String, u64), GenerationError>> for Generation {
    fn from(result: Result<(String, u64), GenerationError>) -> Self {
        match result {
            Ok((text, tokens)) => Generation::success(text, tokens),
            Err(e) => Generation::failure(&e),
        }
    }
}

/// Gateway to the text-generation backend.
///
/// Implementations (adapters) live in the infrastructure layer. `generate`
/// must never panic or propagate an error; every failure resolves to a
/// [`Generation`] with `success == false`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str, max_tokens: Option<u32>) -> Generation;

    /// Tokens consumed by successful calls so far
    fn total_tokens(&self) -> u64 {
        0
    }
}
