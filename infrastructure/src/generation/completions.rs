//! HTTP completions client

use super::protocol::{CompletionRequest, CompletionResponse};
use crate::config::FileGenerationConfig;
use async_trait::async_trait;
use crew_application::{Generation, GenerationError, TextGenerator};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// [`TextGenerator`] backed by a `POST {base_url}/completions` endpoint.
///
/// Every failure (connection, timeout, non-2xx status, malformed body)
/// becomes an unsuccessful [`Generation`]; nothing is retried.
pub struct CompletionsClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    total_tokens: AtomicU64,
}

impl CompletionsClient {
    /// Build a client from the `[generation]` section
    pub fn new(config: &FileGenerationConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GenerationError::Other(e.to_string()))?;

        let endpoint = format!("{}/completions", config.base_url.trim_end_matches('/'));
        info!("Completions client for {} (model {})", endpoint, config.model);

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            total_tokens: AtomicU64::new(0),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, prompt: &str, max_tokens: u32) -> Result<(String, u64), GenerationError> {
        let body = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens,
            temperature: self.temperature,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::ApiError(status.as_u16()));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        parsed
            .into_parts()
            .ok_or_else(|| GenerationError::InvalidResponse("no choices in response".to_string()))
    }
}

#[async_trait]
impl TextGenerator for CompletionsClient {
    async fn generate(&self, prompt: &str, max_tokens: Option<u32>) -> Generation {
        let max_tokens = max_tokens.unwrap_or(self.max_tokens);
        debug!("Generating up to {} tokens ({} byte prompt)", max_tokens, prompt.len());

        let result = self.request(prompt, max_tokens).await;
        match &result {
            Ok((_, tokens)) => {
                self.total_tokens.fetch_add(*tokens, Ordering::Relaxed);
            }
            Err(e) => warn!("Generation failed: {}", e),
        }
        result.into()
    }

    fn total_tokens(&self) -> u64 {
        self.total_tokens.load(Ordering::Relaxed)
    }
}

fn map_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else if e.is_connect() {
        GenerationError::ConnectionError(e.to_string())
    } else {
        GenerationError::Other(e.to_string())
    }
}
