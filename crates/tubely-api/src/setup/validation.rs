//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use tubely_core::{Config, StorageBackend, VideoUrlMode};
use tubely_infra::LogFormat;

/// Validate critical configuration values
///
/// Fails fast on anything that would only surface at the first upload.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    config
        .log_format()
        .parse::<LogFormat>()
        .map_err(anyhow::Error::msg)?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via CORS_ORIGINS."
        ));
    }

    if config.ffprobe_path().trim().is_empty() || config.ffmpeg_path().trim().is_empty() {
        return Err(anyhow::anyhow!("FFPROBE_PATH and FFMPEG_PATH cannot be empty"));
    }

    if config.storage_backend() == StorageBackend::Local && config.is_production() {
        tracing::warn!("Local storage backend in production - videos are served from this host");
    }

    if config.video_url_mode() == VideoUrlMode::Public
        && config.storage_backend() == StorageBackend::S3
        && config.s3_cf_distro().is_none()
    {
        tracing::warn!(
            "VIDEO_URL_MODE=public without S3_CF_DISTRO - the bucket must allow public reads"
        );
    }

    Ok(())
}
