mod agent;
mod cleaner;
mod config;
mod engine;
mod repl;

use agent::Session;
use config::AppConfig;
use engine::LlamaServer;
use std::process;
use tracing::{error, info};
use tracing_subscriber::fmt;

/// Single-threaded runtime; every step of a turn is awaited in order
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    // Logs go to stderr so they stay out of the conversation
    fmt()
        .with_max_level(config.level())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        endpoint = %config.engine.endpoint,
        model = %config.engine.model_path.display(),
        policy = ?config.agent.language_policy,
        "Configuration loaded"
    );

    println!("Initialisation du modèle .gguf...");
    let engine = match LlamaServer::new(config.engine.clone()).await {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "Engine initialization failed");
            eprintln!(" Error loading model: {}", e);
            process::exit(1);
        }
    };
    println!("Le modèle a été chargé avec succès! \n");
    info!(endpoint = engine.endpoint(), "Engine ready");

    let session = Session::new(engine, config.generation.clone(), config.agent.clone());

    if let Err(e) = repl::run(session, &repl::default_history_file()).await {
        error!(error = %e, "Terminal error");
        eprintln!("Terminal error: {}", e);
        process::exit(1);
    }

    info!("Goodbye!");
}
