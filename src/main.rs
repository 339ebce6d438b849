use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use journey_api::config::{self, AppConfig, Environment};
use journey_api::database::DatabaseManager;
use journey_api::AppState;

#[derive(Parser, Debug)]
#[command(name = "journey-api")]
#[command(about = "Travel journal API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "SQLite database URL (overrides DATABASE_URL)")]
    database_url: Option<String>,

    #[arg(long, help = "Configuration preset: development, staging or production (overrides APP_ENV)")]
    env: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("journey_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match args.env.as_deref() {
        Some(env) => AppConfig::for_environment(Environment::parse(env)).with_env_overrides(),
        None => config::config().clone(),
    };
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set in {:?} mode", config.environment);
    }
    tracing::info!("Starting journey-api in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open database")?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let app = journey_api::app(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
