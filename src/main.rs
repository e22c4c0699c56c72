use anyhow::Context;
use tracing_subscriber::EnvFilter;

use yatube_api::config::config;
use yatube_api::database::DatabaseManager;
use yatube_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "yatube_api=info,tower_http=info".into()),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config().clone();
    tracing::info!("Starting Yatube API in {:?} mode", config.environment);
    if yatube_api::is_development!() {
        tracing::warn!("Using development defaults; set APP_ENV and JWT_SECRET for deployments");
    }

    let db = DatabaseManager::connect_and_migrate(&config.database)
        .await
        .context("failed to open database")?;

    let port = config.api.port;
    let state = AppState::new(db.clone(), config).context("JWT_SECRET must be set")?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Yatube API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
