// Engine configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// llama.cpp server base URL
    pub endpoint: String,
    /// Launch `server_binary` with the model instead of connecting to a running server
    pub spawn_server: bool,
    /// Server executable used when `spawn_server` is set
    pub server_binary: String,
    /// GGUF model file
    pub model_path: PathBuf,
    /// Context window; used when the server does not report one
    pub n_ctx: u32,
    /// CPU threads
    pub n_threads: u32,
    /// Layers offloaded to the GPU
    pub n_gpu_layers: u32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// How long to wait for the model to load, in seconds
    pub load_timeout_secs: u64,
    /// Delay between readiness probes in milliseconds
    pub health_poll_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080".to_string(),
            spawn_server: false,
            server_binary: "llama-server".to_string(),
            model_path: PathBuf::from("models/Mistral-Nemo-Instruct-2407.Q4_K_M.gguf"),
            n_ctx: 4096,
            n_threads: 8,
            n_gpu_layers: 4,
            request_timeout_secs: 120,
            load_timeout_secs: 120,
            health_poll_ms: 500,
        }
    }
}

impl EngineConfig {
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}
