use crate::keys::normalize_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

const DEFAULT_BUCKET: &str = "local";

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "./storage")
    /// * `base_url` - Base URL the directory is served under (e.g., "http://localhost:8091/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
        })
    }

    /// Name recorded in `bucket,key` references written by this backend.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// The key is normalized first, then the resolved path is checked to stay
    /// under the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let key = normalize_key(storage_key)?;
        let path = self.base_path.join(key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn upload_stream_with_key(
        &self,
        storage_key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            content_type = %content_type,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(url)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        // Files are served as-is; there is nothing to sign.
        self.key_to_path(storage_key)?;
        Ok(self.generate_url(storage_key))
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const BASE_URL: &str = "http://localhost:8091/media";

    #[tokio::test]
    async fn test_local_storage_upload() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), BASE_URL.to_string())
            .await
            .unwrap();

        let data = b"test data".to_vec();
        let url = storage
            .upload_with_key("/landscape/clip.mp4", data.clone(), "video/mp4")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8091/media/landscape/clip.mp4");
        assert!(dir.path().join("landscape/clip.mp4").exists());

        let stored = std::fs::read(dir.path().join("landscape/clip.mp4")).unwrap();
        assert_eq!(data, stored);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), BASE_URL.to_string())
            .await
            .unwrap();

        let result = storage
            .upload_with_key("../../../etc/passwd", b"x".to_vec(), "text/plain")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("/other/../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_leading_slash_stays_inside_root() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), BASE_URL.to_string())
            .await
            .unwrap();

        let url = storage
            .upload_with_key("/etc/passwd", b"x".to_vec(), "text/plain")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8091/media/etc/passwd");
        assert!(dir.path().join("etc/passwd").exists());
    }

    #[tokio::test]
    async fn test_local_storage_delete_nonexistent() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), BASE_URL.to_string())
            .await
            .unwrap();

        let result = storage.delete("/other/missing.mp4").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_local_storage_upload_then_delete() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), BASE_URL.to_string())
            .await
            .unwrap();

        storage
            .upload_with_key("/portrait/a.mp4", b"test".to_vec(), "video/mp4")
            .await
            .unwrap();

        assert!(dir.path().join("portrait/a.mp4").exists());
        storage.delete("/portrait/a.mp4").await.unwrap();
        assert!(!dir.path().join("portrait/a.mp4").exists());
    }

    #[tokio::test]
    async fn test_local_storage_stream_upload() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), BASE_URL.to_string())
            .await
            .unwrap();

        let data = b"stream test data".to_vec();
        let cursor = std::io::Cursor::new(data.clone());
        let reader = Box::pin(cursor) as Pin<Box<dyn AsyncRead + Send + Unpin>>;

        storage
            .upload_stream_with_key(
                "/other/stream.mp4",
                "video/mp4",
                Some(data.len() as u64),
                reader,
            )
            .await
            .unwrap();

        let stored = std::fs::read(dir.path().join("other/stream.mp4")).unwrap();
        assert_eq!(data, stored);
    }

    #[tokio::test]
    async fn test_presigned_url_is_served_url() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), format!("{}/", BASE_URL))
            .await
            .unwrap()
            .with_bucket("dev-bucket");

        assert_eq!(storage.bucket(), "dev-bucket");
        let url = storage
            .get_presigned_url("/landscape/x.mp4", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8091/media/landscape/x.mp4");
    }
}
