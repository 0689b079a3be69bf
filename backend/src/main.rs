//! Main entry point for the profile backend.
//!
//! This file initializes logging, loads the configuration, sets up the
//! database and adapters, and serves the API routes.

use backend::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    tracing::info!(environment = %config.environment, "configuration loaded");
    if config.ftp_connection().validate().is_err() {
        tracing::warn!("FTP settings incomplete; transfer endpoints will fail until PROFILE_FTP__* is set");
    }

    let state = backend::build_state(&config).await?;
    let app = backend::api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
