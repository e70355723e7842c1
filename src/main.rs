use std::sync::Arc;

use anyhow::Context;
use thansohoc_api::config::{self, AppConfig};
use thansohoc_api::{is_development, is_production};
use thansohoc_api::server::{app, AppState, ServerOptions};
use thansohoc_api::store::MongoStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up MONGODB_URI, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Thần Số Học API in {:?} mode", config.environment);
    if is_development!() {
        tracing::debug!("Configuration: {}", serde_json::to_string(config)?);
    }
    check_auth(config)?;

    let store = MongoStore::connect(&config.database.uri, &config.database.name, config.database.connect_timeout_ms)
        .await
        .context("connecting to MongoDB")?;
    store.ensure_indexes().await.context("creating destination indexes")?;

    let state = AppState::new(Arc::new(store), config.database.legacy_collection.clone());
    let router = app(state, ServerOptions::from_config(config));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, router).await.context("server error")?;

    Ok(())
}

fn check_auth(config: &AppConfig) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_some() {
        return Ok(());
    }
    if is_production!() {
        anyhow::bail!("JWT_SECRET must be set in production");
    }
    tracing::warn!("JWT_SECRET not set: admin routes only check that a bearer token is present");
    Ok(())
}
