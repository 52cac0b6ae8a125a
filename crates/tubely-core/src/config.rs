//! Configuration module
//!
//! Configuration is read once at startup from the environment (and `.env`
//! through dotenvy). Every tunable has a default except `JWT_SECRET`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_FFMPEG_TIMEOUT_SECS, DEFAULT_FFPROBE_TIMEOUT_SECS, DEFAULT_PORT,
    DEFAULT_PRESIGN_TTL_SECS, DEFAULT_STORAGE_TIMEOUT_SECS, DEFAULT_THUMBNAIL_MAX_BYTES,
    DEFAULT_VIDEO_MAX_BYTES,
};
use crate::storage_types::StorageBackend;

/// Where uploaded thumbnails end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStrategy {
    /// Inline `data:` URL on the video record.
    DataUrl,
    /// File under the assets directory, served at `/assets`.
    Assets,
    /// Process-lifetime cache served at `/api/thumbnails/{videoID}`.
    Memory,
}

impl FromStr for ThumbnailStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "data_url" | "dataurl" | "data" => Ok(ThumbnailStrategy::DataUrl),
            "assets" | "disk" => Ok(ThumbnailStrategy::Assets),
            "memory" => Ok(ThumbnailStrategy::Memory),
            _ => Err(anyhow::anyhow!("Invalid thumbnail storage strategy: {}", s)),
        }
    }
}

/// What gets written to `video_url` after an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoUrlMode {
    /// `bucket,key` reference, presigned whenever the video is read.
    Signed,
    /// Direct URL through the CDN host or the backend's public URL.
    Public,
}

impl FromStr for VideoUrlMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "signed" | "presigned" => Ok(VideoUrlMode::Signed),
            "public" => Ok(VideoUrlMode::Public),
            _ => Err(anyhow::anyhow!("Invalid video URL mode: {}", s)),
        }
    }
}

/// Base configuration shared by every Tubely binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub platform_url: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub environment: String,
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    pub db_path: PathBuf,
    // Thumbnails
    pub assets_root: PathBuf,
    pub assets_base_url: String,
    pub thumbnail_strategy: ThumbnailStrategy,
    pub thumbnail_max_bytes: usize,
    pub thumbnail_allowed_content_types: Vec<String>,
    // Object storage
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub aws_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO, R2, ...)
    pub s3_cf_distro: Option<String>,
    pub local_storage_path: PathBuf,
    pub local_storage_base_url: String,
    pub storage_timeout_secs: u64,
    // Videos
    pub video_max_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
    pub video_faststart: bool,
    pub video_url_mode: VideoUrlMode,
    pub presign_ttl_secs: u64,
    pub upload_temp_dir: Option<PathBuf>,
    // External tools
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub ffprobe_timeout_secs: u64,
    pub ffmpeg_timeout_secs: u64,
    pub log_format: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn as_service(&self) -> &ServiceConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = ServiceConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_service().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_service().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.as_service().base.server_port
    }

    pub fn platform_url(&self) -> &str {
        &self.as_service().base.platform_url
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_service().base.cors_origins
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_service().base.jwt_secret
    }

    pub fn environment(&self) -> &str {
        &self.as_service().base.environment
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.as_service().db_path
    }

    pub fn assets_root(&self) -> &PathBuf {
        &self.as_service().assets_root
    }

    pub fn assets_base_url(&self) -> &str {
        &self.as_service().assets_base_url
    }

    pub fn thumbnail_strategy(&self) -> ThumbnailStrategy {
        self.as_service().thumbnail_strategy
    }

    pub fn thumbnail_max_bytes(&self) -> usize {
        self.as_service().thumbnail_max_bytes
    }

    pub fn thumbnail_allowed_content_types(&self) -> &[String] {
        &self.as_service().thumbnail_allowed_content_types
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_service().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_service().s3_bucket.as_deref()
    }

    /// S3 region, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.as_service()
            .s3_region
            .as_deref()
            .or(self.as_service().aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_service().s3_endpoint.as_deref()
    }

    pub fn s3_cf_distro(&self) -> Option<&str> {
        self.as_service().s3_cf_distro.as_deref()
    }

    pub fn local_storage_path(&self) -> &PathBuf {
        &self.as_service().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.as_service().local_storage_base_url
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.as_service().storage_timeout_secs)
    }

    pub fn video_max_bytes(&self) -> usize {
        self.as_service().video_max_bytes
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.as_service().video_allowed_content_types
    }

    pub fn video_faststart(&self) -> bool {
        self.as_service().video_faststart
    }

    pub fn video_url_mode(&self) -> VideoUrlMode {
        self.as_service().video_url_mode
    }

    pub fn presign_ttl(&self) -> Duration {
        Duration::from_secs(self.as_service().presign_ttl_secs)
    }

    pub fn upload_temp_dir(&self) -> Option<&PathBuf> {
        self.as_service().upload_temp_dir.as_ref()
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_service().ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_service().ffmpeg_path
    }

    pub fn ffprobe_timeout(&self) -> Duration {
        Duration::from_secs(self.as_service().ffprobe_timeout_secs)
    }

    pub fn ffmpeg_timeout(&self) -> Duration {
        Duration::from_secs(self.as_service().ffmpeg_timeout_secs)
    }

    pub fn log_format(&self) -> &str {
        &self.as_service().log_format
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ServiceConfig {
    /// Builds the configuration from a variable lookup. `Config::from_env`
    /// passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = get_or("CORS_ORIGINS", "*");
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match get("PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", port, e))?,
            None => DEFAULT_PORT,
        };

        let platform_url = get("PLATFORM_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", server_port))
            .trim_end_matches('/')
            .to_string();

        let jwt_secret =
            get("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;

        let base = BaseConfig {
            server_port,
            platform_url: platform_url.clone(),
            cors_origins,
            jwt_secret,
            environment,
        };

        let assets_base_url = get("ASSETS_BASE_URL")
            .unwrap_or_else(|| format!("{}/assets", platform_url))
            .trim_end_matches('/')
            .to_string();

        let thumbnail_strategy = match get("THUMBNAIL_STORAGE") {
            Some(raw) => raw.parse()?,
            None => ThumbnailStrategy::Assets,
        };

        // An explicitly empty list disables the check, so only fall back when unset.
        let thumbnail_allowed_content_types = match lookup("THUMBNAIL_ALLOWED_CONTENT_TYPES") {
            Some(raw) => parse_list(&raw),
            None => parse_list("image/jpeg,image/png"),
        };
        let video_allowed_content_types = match lookup("VIDEO_ALLOWED_CONTENT_TYPES") {
            Some(raw) => parse_list(&raw),
            None => parse_list("video/mp4"),
        };

        // A blank tool path is kept as-is so startup validation rejects it.
        let tool_path = |key: &str, default: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .unwrap_or_else(|| default.to_string())
        };

        let s3_bucket = get("S3_BUCKET");
        let storage_backend = match get("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None if s3_bucket.is_some() => StorageBackend::S3,
            None => StorageBackend::Local,
        };

        let local_storage_base_url = get("LOCAL_STORAGE_BASE_URL")
            .unwrap_or_else(|| format!("{}/media", platform_url))
            .trim_end_matches('/')
            .to_string();

        let video_faststart = match get("VIDEO_FASTSTART") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow::anyhow!("Invalid VIDEO_FASTSTART value: {}", raw))?,
            None => true,
        };

        let video_url_mode = match get("VIDEO_URL_MODE") {
            Some(raw) => raw.parse()?,
            None => VideoUrlMode::Signed,
        };

        let parse_number = |key: &str, default: u64| -> Result<u64, anyhow::Error> {
            match get(key) {
                Some(raw) => raw
                    .parse::<u64>()
                    .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", key, raw, e)),
                None => Ok(default),
            }
        };

        Ok(ServiceConfig {
            base,
            db_path: PathBuf::from(get_or("DB_PATH", "tubely.json")),
            assets_root: PathBuf::from(get_or("ASSETS_ROOT", "./assets")),
            assets_base_url,
            thumbnail_strategy,
            thumbnail_max_bytes: parse_number(
                "THUMBNAIL_MAX_BYTES",
                DEFAULT_THUMBNAIL_MAX_BYTES as u64,
            )? as usize,
            thumbnail_allowed_content_types,
            storage_backend,
            s3_bucket,
            s3_region: get("S3_REGION"),
            aws_region: get("AWS_REGION"),
            s3_endpoint: get("S3_ENDPOINT"),
            s3_cf_distro: get("S3_CF_DISTRO"),
            local_storage_path: PathBuf::from(get_or("LOCAL_STORAGE_PATH", "./storage")),
            local_storage_base_url,
            storage_timeout_secs: parse_number(
                "STORAGE_TIMEOUT_SECS",
                DEFAULT_STORAGE_TIMEOUT_SECS,
            )?,
            video_max_bytes: parse_number("VIDEO_MAX_BYTES", DEFAULT_VIDEO_MAX_BYTES as u64)?
                as usize,
            video_allowed_content_types,
            video_faststart,
            video_url_mode,
            presign_ttl_secs: parse_number("PRESIGN_TTL_SECS", DEFAULT_PRESIGN_TTL_SECS)?,
            upload_temp_dir: get("UPLOAD_TEMP_DIR").map(PathBuf::from),
            ffprobe_path: tool_path("FFPROBE_PATH", "ffprobe"),
            ffmpeg_path: tool_path("FFMPEG_PATH", "ffmpeg"),
            ffprobe_timeout_secs: parse_number(
                "FFPROBE_TIMEOUT_SECS",
                DEFAULT_FFPROBE_TIMEOUT_SECS,
            )?,
            ffmpeg_timeout_secs: parse_number("FFMPEG_TIMEOUT_SECS", DEFAULT_FFMPEG_TIMEOUT_SECS)?,
            log_format: get_or("LOG_FORMAT", "text").to_lowercase(),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if is_production_env(&self.base.environment) && self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long in production"
            ));
        }

        if self.storage_backend == StorageBackend::S3 && self.s3_bucket.is_none() {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=s3 requires S3_BUCKET to be set"
            ));
        }

        if self.thumbnail_max_bytes == 0 || self.video_max_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limits must be greater than zero"));
        }

        if self.presign_ttl_secs == 0 {
            return Err(anyhow::anyhow!("PRESIGN_TTL_SECS must be greater than zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[("JWT_SECRET", "secret")])).unwrap();
        assert_eq!(config.base.server_port, 8091);
        assert_eq!(config.base.platform_url, "http://localhost:8091");
        assert_eq!(config.assets_base_url, "http://localhost:8091/assets");
        assert_eq!(config.thumbnail_strategy, ThumbnailStrategy::Assets);
        assert_eq!(config.thumbnail_max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.video_max_bytes, 1024 * 1024 * 1024);
        assert_eq!(
            config.thumbnail_allowed_content_types,
            vec!["image/jpeg", "image/png"]
        );
        assert_eq!(config.video_allowed_content_types, vec!["video/mp4"]);
        assert_eq!(config.storage_backend, StorageBackend::Local);
        assert!(config.video_faststart);
        assert_eq!(config.video_url_mode, VideoUrlMode::Signed);
        assert_eq!(config.presign_ttl_secs, 3600);
    }

    #[test]
    fn jwt_secret_is_required() {
        assert!(ServiceConfig::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn empty_allow_list_disables_check() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("THUMBNAIL_ALLOWED_CONTENT_TYPES", ""),
        ]))
        .unwrap();
        assert!(config.thumbnail_allowed_content_types.is_empty());
    }

    #[test]
    fn blank_tool_path_is_kept_blank() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("FFMPEG_PATH", " "),
        ]))
        .unwrap();
        assert_eq!(config.ffmpeg_path, "");
        assert_eq!(config.ffprobe_path, "ffprobe");
    }

    #[test]
    fn s3_bucket_selects_s3_backend() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("S3_BUCKET", "tubely-videos"),
            ("AWS_REGION", "us-east-2"),
            ("VIDEO_FASTSTART", "false"),
            ("VIDEO_URL_MODE", "public"),
        ]))
        .unwrap();
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert!(!config.video_faststart);
        assert_eq!(config.video_url_mode, VideoUrlMode::Public);

        let config = Config(Box::new(config));
        assert_eq!(config.s3_region(), Some("us-east-2"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_wildcard_cors_in_production() {
        let result = ServiceConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("ENVIRONMENT", "production"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn validate_requires_bucket_for_s3() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("STORAGE_BACKEND", "s3"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_strategies() {
        assert_eq!(
            "data_url".parse::<ThumbnailStrategy>().unwrap(),
            ThumbnailStrategy::DataUrl
        );
        assert_eq!(
            "MEMORY".parse::<ThumbnailStrategy>().unwrap(),
            ThumbnailStrategy::Memory
        );
        assert!("s3".parse::<ThumbnailStrategy>().is_err());
    }
}
