//! Application state shared by every handler.

use crate::services::thumbnails::ThumbnailCache;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{FastStartRemuxer, VideoProber};
use tubely_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repository: VideoRepository,
    /// Object store videos are uploaded to.
    pub storage: Arc<dyn Storage>,
    /// Local store behind `/assets` for the `assets` thumbnail strategy.
    pub assets: Arc<dyn Storage>,
    pub thumbnails: ThumbnailCache,
    pub prober: VideoProber,
    pub remuxer: FastStartRemuxer,
}

impl AppState {
    /// Wire the processing tools from config around the given collaborators.
    pub fn new(
        config: Config,
        repository: VideoRepository,
        storage: Arc<dyn Storage>,
        assets: Arc<dyn Storage>,
    ) -> Self {
        let prober = VideoProber::new(config.ffprobe_path(), config.ffprobe_timeout());
        let remuxer = FastStartRemuxer::new(config.ffmpeg_path(), config.ffmpeg_timeout());
        Self {
            config,
            repository,
            storage,
            assets,
            thumbnails: ThumbnailCache::default(),
            prober,
            remuxer,
        }
    }
}
