use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use petcare_api::auth::{FirebaseTokenVerifier, SessionTokenCodec};
use petcare_api::config::{AppConfig, StoreBackend};
use petcare_api::database;
use petcare_api::{app, AppState};

#[derive(Parser)]
#[command(name = "petcare-api")]
#[command(about = "Pet-care tracking API server")]
#[command(version)]
struct Cli {
    #[arg(long, env = "PORT", help = "Listen port, overrides API_PORT")]
    port: Option<u16>,

    #[arg(long, help = "Document store backend: postgres or memory")]
    store: Option<StoreBackend>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Print the effective configuration as JSON and exit")]
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up JWT_SECRET, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("loading configuration")?;
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    if let Some(backend) = cli.store {
        config.store.backend = backend;
    }
    config.validate().context("validating configuration")?;

    let default_filter = if config.api.enable_request_logging {
        "petcare_api=debug,tower_http=debug"
    } else {
        "petcare_api=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Serve => serve(config).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting petcare-api in {:?} mode", config.environment);

    let tokens = SessionTokenCodec::from_config(&config.security).context("session token key")?;
    let verifier = Arc::new(FirebaseTokenVerifier::new(&config.identity));
    let store = database::connect(&config.store)
        .await
        .context("connecting to document store")?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(config, tokens, verifier, store.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
