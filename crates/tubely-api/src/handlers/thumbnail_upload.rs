use crate::auth::AuthenticatedUser;
use crate::error::HttpAppError;
use crate::services::thumbnails::{persist_thumbnail, remove_replaced_asset};
use crate::state::AppState;
use crate::utils::upload::{
    is_content_type_allowed, multipart_error, normalize_media_type, read_file_field,
    VideoIdParam,
};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;
use tubely_core::constants::THUMBNAIL_FIELD;
use tubely_core::models::Video;
use tubely_core::AppError;

#[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %user.user_id))]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    VideoIdParam(video_id): VideoIdParam,
    user: AuthenticatedUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, HttpAppError> {
    let mut multipart = multipart.map_err(multipart_error)?;
    let upload = read_file_field(&mut multipart, THUMBNAIL_FIELD)
        .await?
        .ok_or_else(|| AppError::InvalidInput("Unable to find thumbnail in form".to_string()))?;

    let media_type = normalize_media_type(upload.content_type.as_deref().unwrap_or(""));
    if !is_content_type_allowed(&media_type, state.config.thumbnail_allowed_content_types()) {
        return Err(AppError::NotAcceptable(format!(
            "Unsupported thumbnail type: {}",
            media_type
        ))
        .into());
    }

    let mut video = state
        .repository
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Couldn't find video {}", video_id)))?;

    if !video.is_owned_by(user.user_id) {
        return Err(AppError::Unauthorized("Not authorized to update this video".to_string()).into());
    }

    let size = upload.data.len();
    let thumbnail_url = persist_thumbnail(&state, video_id, upload.data, &media_type).await?;

    let previous = video.thumbnail_url.replace(thumbnail_url.clone());
    state.repository.update_video(&video).await?;

    if let Some(previous) = previous {
        remove_replaced_asset(&state, video_id, &previous, &thumbnail_url).await;
    }

    let video = state
        .repository
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Couldn't find video {}", video_id)))?;

    tracing::info!(
        media_type = %media_type,
        size = size,
        strategy = ?state.config.thumbnail_strategy(),
        "Thumbnail uploaded"
    );

    Ok(Json(video))
}
