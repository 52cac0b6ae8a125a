use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tubely_core::models::{CreateVideoParams, Video};
use uuid::Uuid;

use super::DbError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    videos: HashMap<Uuid, Video>,
}

/// Repository for video records
///
/// No authorization is enforced here; callers check ownership.
#[derive(Clone)]
pub struct VideoRepository {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl VideoRepository {
    /// Open the database at `path`, creating an empty document if missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let repository = Self {
            path: Arc::new(path),
            write_lock: Arc::new(Mutex::new(())),
        };

        if !fs::try_exists(repository.path.as_path()).await? {
            repository.save(&Document::default()).await?;
            tracing::info!(path = %repository.path.display(), "Created video database");
        }

        Ok(repository)
    }

    async fn load(&self) -> Result<Document, DbError> {
        let raw = fs::read(self.path.as_path()).await?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::default());
        }
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Write to a sibling temp file, then rename over the document.
    async fn save(&self, document: &Document) -> Result<(), DbError> {
        let data = serde_json::to_vec_pretty(document)?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tubely.json".to_string());
        let temp_path = self.path.with_file_name(format!(".{}.tmp", file_name));

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, self.path.as_path()).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, params), fields(db.table = "videos", db.operation = "insert"))]
    pub async fn create_video(
        &self,
        user_id: Uuid,
        params: CreateVideoParams,
    ) -> Result<Video, DbError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;

        let video = Video::new(user_id, params);
        document.videos.insert(video.id, video.clone());
        self.save(&document).await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    pub async fn get_video(&self, id: Uuid) -> Result<Option<Video>, DbError> {
        let _guard = self.write_lock.lock().await;
        let document = self.load().await?;
        Ok(document.videos.get(&id).cloned())
    }

    /// Videos owned by `user_id`, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    pub async fn get_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, DbError> {
        let _guard = self.write_lock.lock().await;
        let document = self.load().await?;

        let mut videos: Vec<Video> = document
            .videos
            .into_values()
            .filter(|video| video.user_id == user_id)
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(videos)
    }

    /// Replace the stored record; `created_at` and `user_id` are kept from the
    /// stored copy and `updated_at` is set to now.
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    pub async fn update_video(&self, video: &Video) -> Result<Video, DbError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;

        let stored = document
            .videos
            .get_mut(&video.id)
            .ok_or(DbError::NotFound(video.id))?;

        stored.thumbnail_url = video.thumbnail_url.clone();
        stored.video_url = video.video_url.clone();
        stored.params = video.params.clone();
        stored.updated_at = Utc::now();
        let updated = stored.clone();

        self.save(&document).await?;
        Ok(updated)
    }
}
