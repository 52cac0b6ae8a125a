use crate::auth::AuthenticatedUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::services::signing::sign_video;
use crate::state::AppState;
use crate::utils::upload::VideoIdParam;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tubely_core::models::{CreateVideoParams, Video};
use tubely_core::AppError;

#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(params): ValidatedJson<CreateVideoParams>,
) -> Result<(StatusCode, Json<Video>), HttpAppError> {
    if params.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()).into());
    }

    let video = state.repository.create_video(user.user_id, params).await?;
    tracing::info!(video_id = %video.id, "Video created");

    Ok((StatusCode::CREATED, Json(video)))
}

/// The caller's videos, newest first, with references presigned.
#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Video>>, HttpAppError> {
    let videos = state.repository.get_videos_for_user(user.user_id).await?;
    let ttl = state.config.presign_ttl();

    let mut signed = Vec::with_capacity(videos.len());
    for video in videos {
        signed.push(sign_video(state.storage.as_ref(), video, ttl).await?);
    }

    Ok(Json(signed))
}

#[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %user.user_id))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    VideoIdParam(video_id): VideoIdParam,
    user: AuthenticatedUser,
) -> Result<Json<Video>, HttpAppError> {
    let video = state
        .repository
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    if !video.is_owned_by(user.user_id) {
        return Err(AppError::Unauthorized("Not authorized to view this video".to_string()).into());
    }

    let video = sign_video(state.storage.as_ref(), video, state.config.presign_ttl()).await?;
    Ok(Json(video))
}
