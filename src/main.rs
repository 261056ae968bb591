use std::sync::Arc;

use skyflix_api::api::{create_router, AppState};
use skyflix_api::catalog::PostgresCatalog;
use skyflix_api::config::Config;
use skyflix_api::engine::RecommendationEngine;
use skyflix_api::refresher;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let catalog = PostgresCatalog::connect(&config.database_url).await?;
    sqlx::migrate!().run(catalog.pool()).await?;

    let engine = Arc::new(RecommendationEngine::new(Arc::new(catalog)));

    // Degraded startup: a failed cache build is logged and the server still
    // comes up, serving whatever read models did build
    if let Err(e) = engine.initialize().await {
        tracing::error!(error = %e, "Continuing with partial recommendation caches");
    }

    let refresher = refresher::spawn(
        Arc::clone(&engine),
        std::time::Duration::from_secs(config.refresh_interval_minutes * 60),
    );

    let state = AppState::new(engine, config.is_development());
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, environment = %config.environment, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
