//! Application-wide constants.

/// Issuer claim carried by every access token.
pub const TOKEN_ISSUER: &str = "tubely-access";

/// Multipart field carrying a thumbnail image.
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Multipart field carrying a video file.
pub const VIDEO_FIELD: &str = "video";

/// Suffix appended to a staged upload by the fast-start remuxer.
pub const FASTSTART_SUFFIX: &str = ".processing";

/// Separator of the composite `bucket,key` video reference.
pub const OBJECT_REFERENCE_SEPARATOR: char = ',';

pub const DEFAULT_PORT: u16 = 8091;
pub const DEFAULT_THUMBNAIL_MAX_BYTES: usize = 10 << 20;
pub const DEFAULT_VIDEO_MAX_BYTES: usize = 1 << 30;
pub const DEFAULT_PRESIGN_TTL_SECS: u64 = 3600;
pub const DEFAULT_FFPROBE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FFMPEG_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 600;
