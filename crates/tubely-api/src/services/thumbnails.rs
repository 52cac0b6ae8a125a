//! Thumbnail persistence strategies.

use crate::constants::API_PREFIX;
use crate::state::AppState;
use crate::utils::upload::extension_from_media_type;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tubely_core::{AppError, ThumbnailStrategy};
use uuid::Uuid;

/// Thumbnail bytes with the content type they were uploaded with.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Bytes,
    pub media_type: String,
}

/// Process-lifetime thumbnail store for the `memory` strategy. Never evicted.
#[derive(Clone, Default)]
pub struct ThumbnailCache {
    inner: Arc<RwLock<HashMap<Uuid, Thumbnail>>>,
}

impl ThumbnailCache {
    pub async fn insert(&self, video_id: Uuid, thumbnail: Thumbnail) {
        self.inner.write().await.insert(video_id, thumbnail);
    }

    pub async fn get(&self, video_id: Uuid) -> Option<Thumbnail> {
        self.inner.read().await.get(&video_id).cloned()
    }
}

pub fn data_url(media_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(data))
}

/// Store the thumbnail with the configured strategy and return the URL to
/// record on the video.
#[tracing::instrument(skip_all, fields(video_id = %video_id, media_type = %media_type, size = data.len()))]
pub async fn persist_thumbnail(
    state: &AppState,
    video_id: Uuid,
    data: Bytes,
    media_type: &str,
) -> Result<String, AppError> {
    match state.config.thumbnail_strategy() {
        ThumbnailStrategy::DataUrl => Ok(data_url(media_type, &data)),
        ThumbnailStrategy::Assets => {
            let extension = extension_from_media_type(media_type).ok_or_else(|| {
                AppError::NotAcceptable(format!("Unsupported media type: {}", media_type))
            })?;
            let key = format!("{}.{}", video_id, extension);
            let url = state
                .assets
                .upload_with_key(&key, data.to_vec(), media_type)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
            tracing::debug!(key = %key, "Thumbnail written to assets");
            Ok(url)
        }
        ThumbnailStrategy::Memory => {
            state
                .thumbnails
                .insert(
                    video_id,
                    Thumbnail {
                        data,
                        media_type: media_type.to_string(),
                    },
                )
                .await;
            Ok(format!(
                "{}{}/thumbnails/{}",
                state.config.platform_url().trim_end_matches('/'),
                API_PREFIX,
                video_id
            ))
        }
    }
}

/// Delete this video's previous assets file once the record points at a new one.
///
/// Only `<video_id>.<ext>` files under the assets URL are touched. Failures are
/// logged and never fail the upload.
pub async fn remove_replaced_asset(
    state: &AppState,
    video_id: Uuid,
    previous: &str,
    current: &str,
) {
    if previous == current {
        return;
    }
    let Some(key) = replaced_asset_key(state.config.assets_base_url(), video_id, previous) else {
        return;
    };
    if let Err(e) = state.assets.delete(key).await {
        tracing::warn!(error = %e, key = %key, "Failed to remove replaced thumbnail");
    } else {
        tracing::debug!(key = %key, "Removed replaced thumbnail");
    }
}

fn replaced_asset_key<'a>(
    assets_base_url: &str,
    video_id: Uuid,
    url: &'a str,
) -> Option<&'a str> {
    let key = url
        .strip_prefix(assets_base_url.trim_end_matches('/'))?
        .strip_prefix('/')?;
    let extension = key.strip_prefix(&format!("{}.", video_id))?;
    (!extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric())).then_some(key)
}
