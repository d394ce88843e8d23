//! Recommendation service entry point.
//!
//! Loads configuration, binds the scoring model once, and serves the HTTP API
//! until Ctrl-C.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use server::{RecommendationOrchestrator, Settings, load_scoring_port, router};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let settings = Settings::from_env().context("Reading configuration")?;
    settings.logging.init()?;

    info!("Starting recommendation service");

    let scoring = load_scoring_port(&settings.model_path);
    let orchestrator = RecommendationOrchestrator::from_settings(&settings, scoring)?;

    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("Binding {}", settings.bind_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Recommendation service stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Could not listen for Ctrl-C, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
