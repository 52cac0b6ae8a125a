use std::time::Duration;
use tubely_api::auth::make_jwt;
use uuid::Uuid;

/// Signing secret the test config is built with.
pub const TEST_JWT_SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

/// A caller with a valid access token.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn new() -> Self {
        let user_id = Uuid::new_v4();
        let token = make_jwt(user_id, TEST_JWT_SECRET, Duration::from_secs(3600))
            .expect("Failed to sign test token");
        Self { user_id, token }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
