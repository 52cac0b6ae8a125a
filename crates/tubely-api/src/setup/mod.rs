//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_infra::{init_telemetry, LogFormat};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    let log_format: LogFormat = config.log_format().parse().map_err(anyhow::Error::msg)?;
    init_telemetry(log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let repository = database::setup_database(&config).await?;
    let (storage, assets) = storage::setup_storage(&config).await?;

    let state = Arc::new(AppState::new(config.clone(), repository, storage, assets));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
