// Engine client - HTTP communication with a local llama.cpp server

use super::types::{ServerCompletionRequest, ServerCompletionResponse, ServerProps};
use super::{
    CompletionBackend, CompletionRequest, EngineConfig, EngineError, EngineInitError,
    ManagedServer,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Completion backend served by llama.cpp's HTTP server
pub struct LlamaServer {
    config: EngineConfig,
    client: Client,
    context_size: u32,
    // Held so the child lives as long as the engine
    _process: Option<ManagedServer>,
}

impl LlamaServer {
    /// Connect to (or launch) the server and wait until the model is loaded.
    pub async fn new(config: EngineConfig) -> Result<Self, EngineInitError> {
        info!(
            endpoint = %config.endpoint,
            model = %config.model_path.display(),
            spawn_server = config.spawn_server,
            n_ctx = config.n_ctx,
            "initializing engine"
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(EngineInitError::ClientError)?;

        let mut process = if config.spawn_server {
            Some(ManagedServer::spawn(&config)?)
        } else {
            None
        };

        wait_ready(&client, &config, process.as_mut()).await?;

        let context_size = match fetch_context_size(&client, &config).await {
            Some(n_ctx) => n_ctx,
            None => {
                warn!(
                    fallback = config.n_ctx,
                    "server did not report a context size, using configured value"
                );
                config.n_ctx
            }
        };

        info!(context_size, "engine initialized successfully");
        Ok(Self {
            config,
            client,
            context_size,
            _process: process,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl CompletionBackend for LlamaServer {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, EngineError> {
        let url = self.config.url("/completion");
        let body = ServerCompletionRequest::from(request);

        debug!(
            url = %url,
            prompt_chars = request.prompt.len(),
            n_predict = body.n_predict,
            "sending completion request"
        );

        let start = Instant::now();
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let completion: ServerCompletionResponse = serde_json::from_str(&text)?;
        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            tokens = ?completion.tokens_predicted,
            stopped_word = ?completion.stopped_word,
            stopped_limit = ?completion.stopped_limit,
            "completion received"
        );

        Ok(completion.content)
    }

    fn context_size(&self) -> u32 {
        self.context_size
    }
}

/// Probe `/health` until it answers 200. Without a managed process a single
/// failed probe is fatal; with one we keep polling while the model loads.
async fn wait_ready(
    client: &Client,
    config: &EngineConfig,
    mut process: Option<&mut ManagedServer>,
) -> Result<(), EngineInitError> {
    let url = config.url("/health");
    let deadline = Duration::from_secs(config.load_timeout_secs);
    let start = Instant::now();

    loop {
        let failure = match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(elapsed_ms = start.elapsed().as_millis() as u64, "server ready");
                return Ok(());
            }
            Ok(resp) => format!("HTTP {}", resp.status()),
            Err(e) => e.to_string(),
        };

        let Some(proc_) = process.as_deref_mut() else {
            return Err(EngineInitError::ConnectionFailed(format!("{}: {}", url, failure)));
        };

        if proc_.has_exited() {
            return Err(EngineInitError::ConnectionFailed(format!(
                "inference server exited before becoming ready ({})",
                failure
            )));
        }

        if start.elapsed() >= deadline {
            return Err(EngineInitError::LoadTimeout(config.load_timeout_secs));
        }

        debug!(reason = %failure, "model still loading");
        tokio::time::sleep(Duration::from_millis(config.health_poll_ms)).await;
    }
}

async fn fetch_context_size(client: &Client, config: &EngineConfig) -> Option<u32> {
    let response = client.get(config.url("/props")).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    let body = response.text().await.ok()?;
    let props: ServerProps = serde_json::from_str(&body).ok()?;
    props.default_generation_settings.n_ctx.filter(|n| *n > 0)
}
