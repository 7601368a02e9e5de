use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use nezarat_bot::api;
use nezarat_bot::bootstrap;
use nezarat_bot::config::AppConfig;
use nezarat_bot::database::{DatabaseManager, PgProjectStore, ProjectStore};
use nezarat_bot::telegram::{BotApi, TelegramClient};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up TELEGRAM_TOKEN, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!("Startup error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Starting nezarat-bot in {:?} mode", config.environment);

    if config.security.uses_default_key() {
        warn!("ENCRYPTION_KEY not set; using the built-in default key, stored secrets are not protected");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    let store: Arc<dyn ProjectStore> = Arc::new(PgProjectStore::new(pool.clone()));
    store
        .ensure_schema()
        .await
        .context("schema initialization failed")?;

    let bot: Arc<dyn BotApi> = Arc::new(TelegramClient::new(config.bot.token.clone()));
    let state = bootstrap::build_state(&config, store, bot.clone())
        .await
        .context("failed to resolve bot identity")?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Server running on port {}", config.server.port);

    // Registration runs beside the server; a failure only gets logged
    let bot_config = config.bot.clone();
    tokio::spawn(async move {
        bootstrap::register_webhook(bot.as_ref(), &bot_config).await;
    });

    axum::serve(listener, api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close(&pool).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
