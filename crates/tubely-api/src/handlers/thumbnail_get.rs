use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::VideoIdParam;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tubely_core::AppError;

/// Serve a thumbnail held by the `memory` strategy.
#[tracing::instrument(skip_all, fields(video_id = %video_id))]
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    VideoIdParam(video_id): VideoIdParam,
) -> Result<Response, HttpAppError> {
    let thumbnail = state
        .thumbnails
        .get(video_id)
        .await
        .ok_or_else(|| AppError::NotFound("Thumbnail not found".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, thumbnail.media_type)],
        thumbnail.data,
    )
        .into_response())
}
