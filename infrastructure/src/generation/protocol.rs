//! Wire types of the `/completions` endpoint

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Usage {
    #[serde(default)]
    pub total_tokens: u64,
}

impl CompletionResponse {
    /// Trimmed text of the first choice and the tokens it cost
    pub fn into_parts(self) -> Option<(String, u64)> {
        let tokens = self.usage.map(|u| u.total_tokens).unwrap_or(0);
        self.choices
            .into_iter()
            .next()
            .map(|choice| (choice.text.trim().to_string(), tokens))
    }
}
