//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_storage::{create_assets_storage, create_storage, Storage};

/// Video object store, thumbnail assets store, and the upload staging directory.
pub async fn setup_storage(config: &Config) -> Result<(Arc<dyn Storage>, Arc<dyn Storage>)> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = ?storage.backend_type(),
        bucket = %storage.bucket(),
        "Storage abstraction initialized successfully"
    );

    let assets = create_assets_storage(config).await?;
    tracing::info!(
        assets_root = %config.assets_root().display(),
        "Assets directory ready"
    );

    if let Some(dir) = config.upload_temp_dir() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create upload temp dir {}", dir.display()))?;
    }

    Ok((storage, assets))
}
