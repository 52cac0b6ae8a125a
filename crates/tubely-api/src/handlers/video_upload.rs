use crate::auth::AuthenticatedUser;
use crate::constants::{UPLOAD_TEMP_PREFIX, UPLOAD_TEMP_SUFFIX};
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{
    extension_from_media_type, is_content_type_allowed, multipart_error, normalize_media_type,
    TempFileGuard, VideoIdParam,
};
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tubely_core::constants::VIDEO_FIELD;
use tubely_core::models::ObjectReference;
use tubely_core::{AppError, VideoUrlMode};
use tubely_processing::FastStartRemuxer;
use tubely_storage::keys::{generate_object_name, video_key};
use tubely_storage::Storage;

#[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %user.user_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    VideoIdParam(video_id): VideoIdParam,
    user: AuthenticatedUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, HttpAppError> {
    let start = Instant::now();

    let mut video = state
        .repository
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Couldn't find video {}", video_id)))?;

    if !video.is_owned_by(user.user_id) {
        return Err(AppError::Unauthorized("Not authorized to update this video".to_string()).into());
    }

    let mut multipart = multipart.map_err(multipart_error)?;

    let mut field = loop {
        match multipart.next_field().await.map_err(multipart_error)? {
            Some(field) if field.name() == Some(VIDEO_FIELD) => break field,
            Some(_) => continue,
            None => {
                return Err(
                    AppError::InvalidInput("Unable to find video in form".to_string()).into(),
                )
            }
        }
    };

    let media_type = normalize_media_type(field.content_type().unwrap_or(""));
    if extension_from_media_type(&media_type).is_none()
        || !is_content_type_allowed(&media_type, state.config.video_allowed_content_types())
    {
        return Err(
            AppError::NotAcceptable(format!("Unsupported video type: {}", media_type)).into(),
        );
    }

    let staged = stage_upload(state.config.upload_temp_dir().map(|p| p.as_path()), &mut field)
        .await?;

    let object_name = generate_object_name();
    let aspect_ratio = state.prober.aspect_ratio(staged.path()).await?;
    let key = video_key(aspect_ratio, &object_name);

    // Guard the remux output before the run so a partial file is removed too.
    let processed = if state.config.video_faststart() {
        let guard = TempFileGuard::new(FastStartRemuxer::output_path(staged.path()));
        state.remuxer.remux(staged.path()).await?;
        Some(guard)
    } else {
        None
    };
    let upload_path = processed.as_ref().unwrap_or(&staged).path();

    let public_url = upload_file(
        state.storage.as_ref(),
        state.config.storage_timeout(),
        &key,
        &media_type,
        upload_path,
    )
    .await?;

    let video_url = match state.config.video_url_mode() {
        VideoUrlMode::Signed => ObjectReference::new(state.storage.bucket(), key.clone()).to_string(),
        VideoUrlMode::Public => match state.config.s3_cf_distro() {
            Some(distro) => format!(
                "https://{}/{}",
                distro.trim_end_matches('/'),
                key.trim_start_matches('/')
            ),
            None => public_url,
        },
    };

    video.video_url = Some(video_url);
    if let Err(e) = state.repository.update_video(&video).await {
        let storage = state.storage.clone();
        let storage_key = key.clone();
        tokio::spawn(async move {
            if let Err(cleanup_err) = storage.delete(&storage_key).await {
                tracing::debug!(
                    error = %cleanup_err,
                    storage_key = %storage_key,
                    "Failed to cleanup storage file after DB error"
                );
            }
        });
        return Err(e.into());
    }

    tracing::info!(
        key = %key,
        aspect_ratio = %aspect_ratio,
        faststart = processed.is_some(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Video uploaded"
    );

    Ok(StatusCode::OK)
}

/// Stream the field into a fresh `tubely-upload-*.mp4` file and fsync it.
async fn stage_upload(
    temp_dir: Option<&Path>,
    field: &mut Field<'_>,
) -> Result<TempFileGuard, AppError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(UPLOAD_TEMP_PREFIX).suffix(UPLOAD_TEMP_SUFFIX);
    let temp_file = match temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    let (file, path) = temp_file
        .keep()
        .map_err(|e| AppError::Internal(format!("Failed to stage upload: {}", e)))?;
    let guard = TempFileGuard::new(path);

    let mut file = tokio::fs::File::from_std(file);
    let mut size = 0usize;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size += chunk.len();
        file.write_all(&chunk).await?;
    }
    file.sync_all().await?;

    tracing::debug!(path = %guard.path().display(), size = size, "Upload staged");
    Ok(guard)
}

/// Stream a local file to `storage` under `key`, bounded by `timeout`.
async fn upload_file(
    storage: &dyn Storage,
    timeout: Duration,
    key: &str,
    content_type: &str,
    path: &Path,
) -> Result<String, HttpAppError> {
    let file = tokio::fs::File::open(path).await.map_err(AppError::from)?;
    let content_length = file.metadata().await.map_err(AppError::from)?.len();

    let upload =
        storage.upload_stream_with_key(key, content_type, Some(content_length), Box::pin(file));
    let url = tokio::time::timeout(timeout, upload)
        .await
        .map_err(|_| AppError::Storage(format!("Upload of {} timed out after {:?}", key, timeout)))??;

    Ok(url)
}
