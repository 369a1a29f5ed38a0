// Data types for the engine module - sampling knobs and llama.cpp server wire format

use serde::{Deserialize, Serialize};

/// Upper bound applied to a per-call `max_tokens` override
pub const MAX_TOKENS_CEILING: u32 = 4096;

/// Sampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repeat_penalty: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            repeat_penalty: 1.1,
            max_tokens: 2048,
        }
    }
}

impl GenerationParams {
    /// Copy of these defaults with the given overrides applied.
    pub fn with_overrides(&self, overrides: &GenerationOverrides) -> Self {
        Self {
            temperature: overrides.temperature.unwrap_or(self.temperature),
            top_p: overrides.top_p.unwrap_or(self.top_p),
            top_k: overrides.top_k.unwrap_or(self.top_k),
            repeat_penalty: overrides.repeat_penalty.unwrap_or(self.repeat_penalty),
            max_tokens: overrides
                .max_tokens
                .map(|t| t.min(MAX_TOKENS_CEILING))
                .unwrap_or(self.max_tokens),
        }
    }
}

/// Per-call sampling overrides; `None` keeps the configured default
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOverrides {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub repeat_penalty: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// One completion call, with the token budget already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub params: GenerationParams,
    pub stop: Vec<String>,
}

/// `POST /completion` body
#[derive(Debug, Serialize)]
pub(crate) struct ServerCompletionRequest<'a> {
    pub prompt: &'a str,
    pub n_predict: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repeat_penalty: f32,
    pub stop: &'a [String],
    pub stream: bool,
    pub cache_prompt: bool,
}

impl<'a> From<&'a CompletionRequest> for ServerCompletionRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            prompt: &request.prompt,
            n_predict: request.params.max_tokens,
            temperature: request.params.temperature,
            top_p: request.params.top_p,
            top_k: request.params.top_k,
            repeat_penalty: request.params.repeat_penalty,
            stop: &request.stop,
            stream: false,
            cache_prompt: true,
        }
    }
}

/// `POST /completion` response
#[derive(Debug, Deserialize)]
pub(crate) struct ServerCompletionResponse {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tokens_predicted: Option<u32>,
    #[serde(default)]
    pub stopped_word: Option<bool>,
    #[serde(default)]
    pub stopped_limit: Option<bool>,
}

/// `GET /props` response, only the part we read
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerProps {
    #[serde(default)]
    pub default_generation_settings: ServerGenerationSettings,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerGenerationSettings {
    #[serde(default)]
    pub n_ctx: Option<u32>,
}
