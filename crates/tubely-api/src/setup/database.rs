//! Database setup and initialization

use anyhow::{Context, Result};
use tubely_core::Config;
use tubely_db::VideoRepository;

/// Open the JSON video database, creating it on first start.
pub async fn setup_database(config: &Config) -> Result<VideoRepository> {
    tracing::info!(path = %config.db_path().display(), "Opening database...");
    let repository = VideoRepository::open(config.db_path().clone())
        .await
        .context("Failed to open video database")?;
    tracing::info!("Database opened successfully");
    Ok(repository)
}
