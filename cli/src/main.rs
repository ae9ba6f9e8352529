//! CLI entrypoint for mongochat
//!
//! This is the main binary that wires together all layers using
//! dependency injection and serves the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mongochat_application::{RunTurnUseCase, SessionManager};
use mongochat_domain::Model;
use mongochat_infrastructure::{ConfigLoader, McpToolProvider, OpenAiGateway, load_guidance};
use mongochat_server::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mongochat", version, about = "Chat with your MongoDB deployment")]
struct Cli {
    /// Path to a config file (overrides discovered configs)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip all config files and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the model
    #[arg(short, long)]
    model: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting mongochat");

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }

    let model = Model::new(config.llm.model.clone());
    let params = config.execution_params();
    let guidance = load_guidance(config.guidance.path.as_deref());

    // === Dependency Injection ===
    let gateway = Arc::new(
        OpenAiGateway::from_config(&config.llm)
            .map_err(|e| anyhow::anyhow!("LLM gateway setup failed: {e}"))?,
    );
    let provider = Arc::new(McpToolProvider::new(config.mcp.clone()));
    let sessions = Arc::new(SessionManager::new(provider, params.clone()));
    let use_case = Arc::new(
        RunTurnUseCase::new(gateway, Arc::clone(&sessions), params).with_guidance(guidance),
    );

    let state = AppState::new(use_case, model);
    let app = mongochat_server::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sessions))
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal(sessions: Arc<SessionManager>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down");
    sessions.release().await;
}
