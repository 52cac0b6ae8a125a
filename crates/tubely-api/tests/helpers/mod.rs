//! Test helpers: build AppState and router for integration tests.
//!
//! Every app gets its own temp directory holding the JSON database, the local
//! object store, the assets directory, the upload staging directory and the
//! `ffprobe`/`ffmpeg` stand-ins.
//!
//! Run from workspace root: `cargo test -p tubely-api`.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::constants;
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_core::{Config, ServiceConfig};
use tubely_db::VideoRepository;
use tubely_storage::{create_assets_storage, LocalStorage, Storage};
use uuid::Uuid;

use auth::{TestUser, TEST_JWT_SECRET};
use fixtures::{FfmpegBehavior, FfprobeBehavior};

/// Bucket name the local video store reports in `bucket,key` references.
pub const TEST_BUCKET: &str = "tubely-test";

pub const TEST_PLATFORM_URL: &str = "http://localhost:8091";

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Knobs for one test app.
pub struct TestAppOptions {
    pub ffprobe: FfprobeBehavior,
    pub ffmpeg: FfmpegBehavior,
    /// Extra environment, applied over the defaults.
    pub env: Vec<(&'static str, &'static str)>,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            ffprobe: FfprobeBehavior::Report("16:9"),
            ffmpeg: FfmpegBehavior::Copy,
            env: Vec::new(),
        }
    }
}

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.temp_dir.path().join("storage")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.temp_dir.path().join("assets")
    }

    /// Staging file the JSON database writes before renaming over itself.
    pub fn db_staging_path(&self) -> PathBuf {
        self.temp_dir.path().join(".tubely.json.tmp")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.temp_dir.path().join("uploads")
    }

    /// Names of files left in the upload staging directory.
    pub fn leftover_uploads(&self) -> Vec<String> {
        std::fs::read_dir(self.upload_dir())
            .expect("Failed to read upload dir")
            .map(|entry| {
                entry
                    .expect("Failed to read dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    /// Relative paths of every object in the local video store.
    pub fn stored_objects(&self) -> Vec<String> {
        fn walk(root: &std::path::Path, dir: &std::path::Path, out: &mut Vec<String>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(root, &path, out);
                } else if let Ok(relative) = path.strip_prefix(root) {
                    out.push(relative.to_string_lossy().into_owned());
                }
            }
        }

        let root = self.storage_dir();
        let mut objects = Vec::new();
        walk(&root, &root, &mut objects);
        objects
    }

    /// Create a draft video owned by `user` and return its id.
    pub async fn create_video(&self, user: &TestUser, title: &str) -> Uuid {
        let response = self
            .server
            .post(&api_path("/videos"))
            .add_header("Authorization", user.bearer())
            .json(&serde_json::json!({ "title": title, "description": "integration test" }))
            .await;
        assert_eq!(response.status_code(), 201);

        let body: serde_json::Value = response.json();
        Uuid::parse_str(body["id"].as_str().expect("Expected 'id' in response"))
            .expect("Invalid UUID in response")
    }

    /// Stored record as seen by its owner.
    pub async fn get_video(&self, user: &TestUser, video_id: Uuid) -> serde_json::Value {
        let response = self
            .server
            .get(&api_path(&format!("/videos/{}", video_id)))
            .add_header("Authorization", user.bearer())
            .await;
        assert_eq!(response.status_code(), 200);
        response.json()
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestAppOptions::default()).await
}

/// Setup test app with an isolated database, local storage and tool stand-ins.
pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let root = temp_dir.path();
    let bin_dir = root.join("bin");
    std::fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");

    #[cfg(unix)]
    let (ffprobe, ffmpeg) = (
        fixtures::write_ffprobe(&bin_dir, options.ffprobe),
        fixtures::write_ffmpeg(&bin_dir, options.ffmpeg),
    );
    #[cfg(not(unix))]
    let (ffprobe, ffmpeg) = (bin_dir.join("ffprobe"), bin_dir.join("ffmpeg"));

    let mut vars: HashMap<String, String> = HashMap::new();
    let path_var = |name: &str| root.join(name).to_string_lossy().into_owned();
    vars.insert("JWT_SECRET".into(), TEST_JWT_SECRET.into());
    vars.insert("PLATFORM_URL".into(), TEST_PLATFORM_URL.into());
    vars.insert("DB_PATH".into(), path_var("tubely.json"));
    vars.insert("ASSETS_ROOT".into(), path_var("assets"));
    vars.insert("LOCAL_STORAGE_PATH".into(), path_var("storage"));
    vars.insert("UPLOAD_TEMP_DIR".into(), path_var("uploads"));
    vars.insert(
        "FFPROBE_PATH".into(),
        ffprobe.to_string_lossy().into_owned(),
    );
    vars.insert("FFMPEG_PATH".into(), ffmpeg.to_string_lossy().into_owned());
    for (key, value) in &options.env {
        vars.insert(key.to_string(), value.to_string());
    }

    let config = Config(Box::new(
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
            .expect("Failed to build test config"),
    ));

    std::fs::create_dir_all(root.join("uploads")).expect("Failed to create upload dir");

    let repository = VideoRepository::open(config.db_path().clone())
        .await
        .expect("Failed to open test database");
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(
            config.local_storage_path().clone(),
            config.local_storage_base_url().to_string(),
        )
        .await
        .expect("Failed to create local storage")
        .with_bucket(TEST_BUCKET),
    );
    let assets = create_assets_storage(&config)
        .await
        .expect("Failed to create assets storage");

    let state = Arc::new(AppState::new(config.clone(), repository, storage, assets));
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        temp_dir,
    }
}
