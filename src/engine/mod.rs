// Engine module - local LLM inference backend
//
// The model itself is owned by a llama.cpp server. We either connect to one
// that is already running or launch it with the configured model file.

pub mod client;
pub mod config;
pub mod error;
pub mod process;
pub mod types;

pub use client::LlamaServer;
pub use config::EngineConfig;
pub use error::{EngineError, EngineInitError};
pub use process::ManagedServer;
pub use types::{CompletionRequest, GenerationOverrides, GenerationParams};

use async_trait::async_trait;

/// Anything that can turn a prompt into generated text
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, EngineError>;

    /// Context window in tokens
    fn context_size(&self) -> u32;
}
