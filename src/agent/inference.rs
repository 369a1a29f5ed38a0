// Inference retry wrapper - one prompt, a few attempts, cleaned output

use crate::cleaner::Cleaner;
use crate::engine::{CompletionBackend, CompletionRequest, GenerationOverrides, GenerationParams};

use super::error::GenerationFailure;
use super::persona;

use tracing::{debug, error, info, warn};

/// Stop sequences passed with every completion
pub const STOP_SEQUENCES: &[&str] = &["</s>", "<|endoftext|>", "User:", "Utilisateur:", "\n\n\n"];

/// A cleaned response must be longer than this to be accepted
pub const MIN_ACCEPTED_CHARS: usize = 5;

/// Rough token count: whitespace-separated words.
pub fn estimate_prompt_tokens(prompt: &str) -> u32 {
    prompt.split_whitespace().count().try_into().unwrap_or(u32::MAX)
}

/// Tokens left for the completion once the prompt and margin are accounted for.
pub fn token_budget(requested: u32, context_size: u32, prompt_tokens: u32, margin: u32) -> u32 {
    requested.min(
        context_size
            .saturating_sub(prompt_tokens)
            .saturating_sub(margin),
    )
}

/// Runs prompts against a backend with retries and cleaning
pub struct Generator<B: CompletionBackend> {
    backend: B,
    cleaner: Cleaner,
    defaults: GenerationParams,
    max_attempts: u32,
    safety_margin: u32,
}

impl<B: CompletionBackend> Generator<B> {
    pub fn new(
        backend: B,
        cleaner: Cleaner,
        defaults: GenerationParams,
        max_attempts: u32,
        safety_margin: u32,
    ) -> Self {
        Self {
            backend,
            cleaner,
            defaults,
            max_attempts: max_attempts.max(1),
            safety_margin,
        }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Cleaned text, or the reason the last attempt failed.
    pub async fn try_generate(
        &self,
        prompt: &str,
        overrides: &GenerationOverrides,
    ) -> Result<String, GenerationFailure> {
        let params = self.defaults.with_overrides(overrides);
        let mut last_failure = GenerationFailure::EmptyOutput;

        for attempt in 1..=self.max_attempts {
            match self.attempt(prompt, &params).await {
                Ok(text) => {
                    info!(attempt, chars = text.chars().count(), "response accepted");
                    return Ok(text);
                }
                Err(failure @ GenerationFailure::ContextExhausted { .. }) => {
                    error!(error = %failure, "prompt does not fit the context window");
                    return Err(failure);
                }
                Err(failure) => {
                    if attempt == self.max_attempts {
                        error!(attempt, error = %failure, "generation failed: exhausted attempts");
                    } else {
                        warn!(attempt, max_attempts = self.max_attempts, error = %failure, "generation attempt rejected, retrying");
                    }
                    last_failure = failure;
                }
            }
        }

        Err(last_failure)
    }

    /// Like [`Self::try_generate`], with failures replaced by a canned fallback.
    pub async fn generate(&self, prompt: &str, overrides: &GenerationOverrides) -> String {
        match self.try_generate(prompt, overrides).await {
            Ok(text) => text,
            Err(failure) => {
                warn!(reason = %failure, "no usable response, using fallback");
                persona::random_fallback().to_string()
            }
        }
    }

    async fn attempt(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationFailure> {
        let context_size = self.backend.context_size();
        let prompt_tokens = estimate_prompt_tokens(prompt);
        let budget = token_budget(params.max_tokens, context_size, prompt_tokens, self.safety_margin);
        if budget == 0 {
            return Err(GenerationFailure::ContextExhausted {
                context_size,
                prompt_tokens,
            });
        }

        let request = CompletionRequest {
            prompt: prompt.to_string(),
            params: GenerationParams {
                max_tokens: budget,
                ..params.clone()
            },
            stop: STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        };

        debug!(prompt_tokens, budget, context_size, "invoking backend");
        let raw = self
            .backend
            .complete(&request)
            .await
            .map_err(|e| GenerationFailure::LibraryError(e.to_string()))?;

        let cleaned = self.cleaner.clean(&raw);
        let chars = cleaned.chars().count();
        if chars == 0 {
            debug!(raw = %raw, "cleaning left nothing");
            Err(GenerationFailure::EmptyOutput)
        } else if chars <= MIN_ACCEPTED_CHARS {
            Err(GenerationFailure::TooShort(chars))
        } else {
            Ok(cleaned)
        }
    }
}
