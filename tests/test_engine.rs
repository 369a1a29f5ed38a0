// Integration tests for Engine module
// This file should be run with cargo test --test test_engine

#[path = "../src/engine/mod.rs"]
#[allow(dead_code)]
mod engine;

use engine::{
    CompletionBackend, CompletionRequest, EngineConfig, EngineError, EngineInitError,
    GenerationParams, LlamaServer,
};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .init();
    });
}

/// Canned answers for the fake llama.cpp server
#[derive(Clone)]
struct Routes {
    props: Option<String>,
    completion_status: u16,
    completion_body: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            props: Some(r#"{"default_generation_settings":{"n_ctx":2048}}"#.to_string()),
            completion_status: 200,
            completion_body: r#"{"content":" The kettle is boiling.","tokens_predicted":6,"stopped_word":true,"stopped_limit":false}"#.to_string(),
        }
    }
}

type Captured = Arc<Mutex<Vec<(String, String)>>>;

// Test helper: serve `routes` on an ephemeral port, recording every request
async fn start_server(routes: Routes) -> (String, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));

    let log = captured.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            let log = log.clone();
            tokio::spawn(async move {
                handle_connection(stream, routes, log).await;
            });
        }
    });

    (format!("http://{}", addr), captured)
}

async fn handle_connection(mut stream: TcpStream, routes: Routes, log: Captured) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request_line = head.lines().next().unwrap_or_default().to_string();
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    log.lock().unwrap().push((path.clone(), body));

    let (status, payload) = match path.as_str() {
        "/health" => (200, r#"{"status":"ok"}"#.to_string()),
        "/props" => match routes.props {
            Some(props) => (200, props),
            None => (404, r#"{"error":"not found"}"#.to_string()),
        },
        "/completion" => (routes.completion_status, routes.completion_body),
        _ => (404, r#"{"error":"not found"}"#.to_string()),
    };

    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        payload.len(),
        payload
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn config_for(endpoint: &str) -> EngineConfig {
    EngineConfig {
        endpoint: endpoint.to_string(),
        request_timeout_secs: 5,
        load_timeout_secs: 2,
        health_poll_ms: 50,
        ..Default::default()
    }
}

fn request(prompt: &str) -> CompletionRequest {
    CompletionRequest {
        prompt: prompt.to_string(),
        params: GenerationParams {
            max_tokens: 128,
            ..Default::default()
        },
        stop: vec!["\nUser:".to_string()],
    }
}

#[cfg(test)]
mod engine_tests {
    use super::*;

    #[tokio::test]
    async fn test_context_size_from_props() {
        init_tracing();
        let (endpoint, captured) = start_server(Routes::default()).await;

        let server = LlamaServer::new(config_for(&endpoint)).await.unwrap();
        assert_eq!(server.context_size(), 2048);
        assert_eq!(server.endpoint(), endpoint);

        let paths: Vec<String> = captured.lock().unwrap().iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(paths, vec!["/health".to_string(), "/props".to_string()]);
    }

    #[tokio::test]
    async fn test_context_size_falls_back_to_config() {
        init_tracing();
        let routes = Routes {
            props: None,
            ..Default::default()
        };
        let (endpoint, _) = start_server(routes).await;

        let mut config = config_for(&endpoint);
        config.n_ctx = 3072;
        let server = LlamaServer::new(config).await.unwrap();
        assert_eq!(server.context_size(), 3072);
    }

    #[tokio::test]
    async fn test_complete_sends_sampling_params() {
        init_tracing();
        let (endpoint, captured) = start_server(Routes::default()).await;
        let server = LlamaServer::new(config_for(&endpoint)).await.unwrap();

        let text = server.complete(&request("User: is it hot?\nBissi:")).await.unwrap();
        assert_eq!(text, " The kettle is boiling.");

        let log = captured.lock().unwrap();
        let (path, body) = log.last().unwrap();
        assert_eq!(path, "/completion");

        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["prompt"], "User: is it hot?\nBissi:");
        assert_eq!(json["n_predict"], 128);
        assert_eq!(json["top_k"], 40);
        assert_eq!(json["stream"], false);
        assert_eq!(json["cache_prompt"], true);
        assert_eq!(json["stop"][0], "\nUser:");
    }

    #[tokio::test]
    async fn test_server_error_status() {
        init_tracing();
        let routes = Routes {
            completion_status: 500,
            completion_body: r#"{"error":"slot unavailable"}"#.to_string(),
            ..Default::default()
        };
        let (endpoint, _) = start_server(routes).await;
        let server = LlamaServer::new(config_for(&endpoint)).await.unwrap();

        let err = server.complete(&request("hello")).await.unwrap_err();
        match err {
            EngineError::Status { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("slot unavailable"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_completion_body() {
        init_tracing();
        let routes = Routes {
            completion_body: "not json".to_string(),
            ..Default::default()
        };
        let (endpoint, _) = start_server(routes).await;
        let server = LlamaServer::new(config_for(&endpoint)).await.unwrap();

        let err = server.complete(&request("hello")).await.unwrap_err();
        assert!(matches!(err, EngineError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_no_server_running() {
        init_tracing();
        // Grab a free port, then release it
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let result = LlamaServer::new(config_for(&format!("http://127.0.0.1:{}", port))).await;
        assert!(matches!(result, Err(EngineInitError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_spawn_requires_model_file() {
        init_tracing();
        let config = EngineConfig {
            spawn_server: true,
            model_path: "/nonexistent/model.gguf".into(),
            ..config_for("http://127.0.0.1:1")
        };

        let result = LlamaServer::new(config).await;
        assert!(matches!(result, Err(EngineInitError::ModelMissing(_))));
    }
}
