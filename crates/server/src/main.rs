//! Diagnosis server - demo prediction API
//!
//! Serves simulated multi-model predictions, the model catalog and the
//! glossary over HTTP.

use anyhow::Result;
use diagnosis_lib::StructuredLogger;
use diagnosis_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ServerConfig::load()?;
    info!(
        port = config.port,
        history_capacity = config.history_capacity,
        seeded = config.seed.is_some(),
        "Server configured"
    );

    let logger = StructuredLogger::new("diagnosis-server");
    logger.log_startup(SERVER_VERSION, &format!("0.0.0.0:{}", config.port));

    let state = Arc::new(api::AppState::new(&config));

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    api::serve(config.port, state, shutdown).await?;

    logger.log_shutdown("SIGINT received");
    Ok(())
}
