//! Common utilities for file upload handlers

use crate::error::HttpAppError;
use axum::extract::{FromRequestParts, Multipart, Path};
use axum::http::request::Parts;
use bytes::Bytes;
use std::path::{Path as FsPath, PathBuf};
use tubely_core::AppError;
use uuid::Uuid;

/// `{videoID}` path segment, rejected with 400 when it is not a UUID.
#[derive(Debug, Clone, Copy)]
pub struct VideoIdParam(pub Uuid);

impl<S> FromRequestParts<S> for VideoIdParam
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidInput(format!("Invalid ID: {}", e.body_text())))?;
        let id = Uuid::parse_str(&raw)
            .map_err(|_| AppError::InvalidInput(format!("Invalid ID: {}", raw)))?;
        Ok(VideoIdParam(id))
    }
}

pub(crate) fn multipart_error(err: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("Unable to parse form: {}", err))
}

/// An uploaded file read fully into memory.
#[derive(Debug)]
pub struct UploadedFile {
    pub data: Bytes,
    /// Declared `Content-Type` of the part, if any.
    pub content_type: Option<String>,
}

/// Read the first field named `field_name`. Other fields are skipped.
pub async fn read_file_field(
    multipart: &mut Multipart,
    field_name: &str,
) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(field_name) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(UploadedFile { data, content_type }));
    }
    Ok(None)
}

/// Media type of a `Content-Type` value, parameters dropped and lowercased.
pub fn normalize_media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// An empty allow-list accepts everything.
pub fn is_content_type_allowed(media_type: &str, allowed: &[String]) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a.eq_ignore_ascii_case(media_type))
}

/// File extension taken from the media subtype (`image/png` -> `png`).
pub fn extension_from_media_type(media_type: &str) -> Option<&str> {
    let (_, subtype) = media_type.split_once('/')?;
    let subtype = subtype.split('+').next().unwrap_or(subtype);
    if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(subtype)
}

/// Deletes the file at `path` when dropped.
#[derive(Debug)]
pub struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &FsPath {
        &self.path
    }
}

impl Drop for TempFileGuard {
    // Synchronous unlink: the file must be gone before the response is sent,
    // and a single unlink does not stall the runtime in practice.
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to remove temp file"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_media_type() {
        assert_eq!(normalize_media_type("image/PNG; charset=binary"), "image/png");
        assert_eq!(normalize_media_type(" video/mp4 "), "video/mp4");
        assert_eq!(normalize_media_type(""), "");
    }

    #[test]
    fn test_allow_list() {
        let allowed = vec!["image/jpeg".to_string(), "image/png".to_string()];
        assert!(is_content_type_allowed("image/png", &allowed));
        assert!(!is_content_type_allowed("image/gif", &allowed));
        assert!(is_content_type_allowed("image/gif", &[]));
    }

    #[test]
    fn test_extension_from_media_type() {
        assert_eq!(extension_from_media_type("image/png"), Some("png"));
        assert_eq!(extension_from_media_type("video/mp4"), Some("mp4"));
        assert_eq!(extension_from_media_type("image/svg+xml"), Some("svg"));
        assert_eq!(extension_from_media_type("image/../x"), None);
        assert_eq!(extension_from_media_type("png"), None);
    }

    #[test]
    fn test_temp_file_guard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.mp4");
        std::fs::write(&path, b"data").unwrap();

        {
            let guard = TempFileGuard::new(&path);
            assert!(guard.path().exists());
        }
        assert!(!path.exists());

        // Already gone: dropping again is quiet.
        drop(TempFileGuard::new(&path));
    }
}
