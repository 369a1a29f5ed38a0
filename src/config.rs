// Application configuration - TOML file with environment overrides

use crate::agent::AgentConfig;
use crate::engine::{EngineConfig, GenerationParams};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{Level, info, warn};

pub const CONFIG_PATH_VAR: &str = "BISSI_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "bissi.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything loaded at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// trace, debug, info, warn or error
    pub log_level: Option<String>,
    pub engine: EngineConfig,
    pub generation: GenerationParams,
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Load from `$BISSI_CONFIG` (or `bissi.toml`), then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Self::from_file(&path)?;
        config.apply_env();
        Ok(config)
    }

    /// Parse a config file; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) {
        let engine = &mut self.engine;
        engine.endpoint = parse_env_var("BISSI_ENDPOINT", engine.endpoint.clone());
        engine.model_path = parse_env_var("BISSI_MODEL_PATH", engine.model_path.clone());
        engine.n_ctx = parse_env_var("BISSI_N_CTX", engine.n_ctx);
        engine.n_threads = parse_env_var("BISSI_N_THREADS", engine.n_threads);
        engine.n_gpu_layers = parse_env_var("BISSI_N_GPU_LAYERS", engine.n_gpu_layers);
        engine.spawn_server = parse_env_var("BISSI_SPAWN_SERVER", engine.spawn_server);

        self.agent.language_policy =
            parse_env_var("BISSI_LANGUAGE_POLICY", self.agent.language_policy);

        if let Ok(level) = std::env::var("BISSI_LOG_LEVEL") {
            self.log_level = Some(level);
        }
    }

    /// Log level for the subscriber; unknown names fall back to WARN.
    pub fn level(&self) -> Level {
        self.log_level
            .as_deref()
            .and_then(|l| l.parse().ok())
            .unwrap_or(Level::WARN)
    }
}

/// Parse an environment variable, logging a warning if the value is present but invalid.
fn parse_env_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(v) => match v.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(var = name, value = %v, "Invalid env var value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
