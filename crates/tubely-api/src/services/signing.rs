//! Presigned GET URLs for `bucket,key` video references.

use std::time::Duration;
use tubely_core::models::{ObjectReference, Video};
use tubely_core::AppError;
use tubely_storage::Storage;

/// Presign a `bucket,key` reference against `storage`.
pub async fn presign_reference(
    storage: &dyn Storage,
    reference: &str,
    ttl: Duration,
) -> Result<String, AppError> {
    let reference: ObjectReference = reference
        .parse()
        .map_err(|e: anyhow::Error| AppError::Internal(e.to_string()))?;

    if reference.bucket != storage.bucket() {
        return Err(AppError::Internal(format!(
            "Bucket {} is not served by this storage backend",
            reference.bucket
        )));
    }

    storage
        .get_presigned_url(&reference.key, ttl)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))
}

/// Replace a `bucket,key` video reference with a presigned URL. Direct URLs
/// and videos without an upload are returned unchanged.
pub async fn sign_video(
    storage: &dyn Storage,
    mut video: Video,
    ttl: Duration,
) -> Result<Video, AppError> {
    let Some(video_url) = video.video_url.as_deref() else {
        return Ok(video);
    };
    if video_url.parse::<ObjectReference>().is_err() {
        return Ok(video);
    }

    let signed = presign_reference(storage, video_url, ttl).await?;
    video.video_url = Some(signed);
    Ok(video)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_core::models::CreateVideoParams;
    use tubely_storage::LocalStorage;
    use uuid::Uuid;

    async fn storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(
            dir.path().to_path_buf(),
            "http://localhost:8091/media".to_string(),
        )
        .await
        .unwrap()
        .with_bucket("tubely")
    }

    fn video(video_url: Option<&str>) -> Video {
        let mut video = Video::new(Uuid::new_v4(), CreateVideoParams::default());
        video.video_url = video_url.map(String::from);
        video
    }

    #[tokio::test]
    async fn test_presign_reference() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;

        let url = presign_reference(&storage, "tubely,/landscape/abc.mp4", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8091/media/landscape/abc.mp4");
    }

    #[tokio::test]
    async fn test_presign_rejects_foreign_bucket_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;
        let ttl = Duration::from_secs(60);

        assert!(presign_reference(&storage, "other,/landscape/abc.mp4", ttl)
            .await
            .is_err());
        assert!(presign_reference(&storage, "no-separator", ttl).await.is_err());
    }

    #[tokio::test]
    async fn test_sign_video_passes_through_direct_urls() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;
        let ttl = Duration::from_secs(60);

        let direct = video(Some("https://cdn.example.com/landscape/abc.mp4"));
        let signed = sign_video(&storage, direct.clone(), ttl).await.unwrap();
        assert_eq!(signed, direct);

        let empty = video(None);
        assert_eq!(sign_video(&storage, empty.clone(), ttl).await.unwrap(), empty);

        let referenced = video(Some("tubely,/portrait/abc.mp4"));
        let signed = sign_video(&storage, referenced, ttl).await.unwrap();
        assert_eq!(
            signed.video_url.as_deref(),
            Some("http://localhost:8091/media/portrait/abc.mp4")
        );
    }
}
