use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use quoteforge::ai::GeminiEngine;
use quoteforge::config::AppConfig;
use quoteforge::database::init_db;
use quoteforge::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to initialize database")?;

    let suggestions = Arc::new(GeminiEngine::new(&config.ai));

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        config: Arc::new(config),
        suggestions,
    };

    let app = quoteforge::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
