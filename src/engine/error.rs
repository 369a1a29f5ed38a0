// Error types for Engine module

use std::path::PathBuf;
use thiserror::Error;

/// Runtime errors from a completion call
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors while loading the model / reaching the server
#[derive(Debug, Error)]
pub enum EngineInitError {
    #[error("Model file not found: {0}")]
    ModelMissing(PathBuf),

    #[error("Invalid endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("Failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create HTTP client: {0}")]
    ClientError(#[from] reqwest::Error),

    #[error("Model not ready after {0} seconds")]
    LoadTimeout(u64),

    #[error("Connection check failed: {0}")]
    ConnectionFailed(String),
}
