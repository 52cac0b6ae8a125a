/// API path prefix for all routes.
pub const API_PREFIX: &str = "/api";

/// Server-level cap on in-flight requests.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Public mount point of the assets directory.
pub const ASSETS_ROUTE: &str = "/assets";

/// Public mount point of the local video store.
pub const MEDIA_ROUTE: &str = "/media";

/// Prefix of staged video uploads in the temp directory.
pub const UPLOAD_TEMP_PREFIX: &str = "tubely-upload-";

/// Suffix of staged video uploads in the temp directory.
pub const UPLOAD_TEMP_SUFFIX: &str = ".mp4";
