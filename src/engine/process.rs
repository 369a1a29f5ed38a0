// Managed llama.cpp server process - loads the model on our behalf

use super::{EngineConfig, EngineInitError};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// A `llama-server` child that is killed when dropped
#[derive(Debug)]
pub struct ManagedServer {
    child: Child,
}

impl ManagedServer {
    /// Launch the server for the configured model.
    pub fn spawn(config: &EngineConfig) -> Result<Self, EngineInitError> {
        if !config.model_path.exists() {
            return Err(EngineInitError::ModelMissing(config.model_path.clone()));
        }

        let url = reqwest::Url::parse(&config.endpoint)
            .map_err(|_| EngineInitError::InvalidEndpoint(config.endpoint.clone()))?;
        let host = url
            .host_str()
            .ok_or_else(|| EngineInitError::InvalidEndpoint(config.endpoint.clone()))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| EngineInitError::InvalidEndpoint(config.endpoint.clone()))?;

        let args = server_args(config, &host, port);
        info!(binary = %config.server_binary, args = ?args, "launching inference server");

        let child = Command::new(&config.server_binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineInitError::Spawn {
                binary: config.server_binary.clone(),
                source,
            })?;

        Ok(Self { child })
    }

    /// True once the child has terminated.
    pub fn has_exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                warn!(status = %status, "inference server exited");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "could not poll inference server");
                false
            }
        }
    }
}

fn server_args(config: &EngineConfig, host: &str, port: u16) -> Vec<String> {
    vec![
        "-m".to_string(),
        config.model_path.display().to_string(),
        "-c".to_string(),
        config.n_ctx.to_string(),
        "-t".to_string(),
        config.n_threads.to_string(),
        "-ngl".to_string(),
        config.n_gpu_layers.to_string(),
        "--host".to_string(),
        host.to_string(),
        "--port".to_string(),
        port.to_string(),
    ]
}
