// Agent errors

use thiserror::Error;

/// Why a generation attempt produced nothing usable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("model output was empty after cleaning")]
    EmptyOutput,

    #[error("cleaned output too short ({0} chars)")]
    TooShort(usize),

    #[error("inference library error: {0}")]
    LibraryError(String),

    #[error("prompt of ~{prompt_tokens} tokens leaves no room in a {context_size}-token context")]
    ContextExhausted { context_size: u32, prompt_tokens: u32 },
}
