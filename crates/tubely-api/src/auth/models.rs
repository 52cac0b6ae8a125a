use crate::auth::jwt::{get_bearer_token, validate_jwt};
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub iss: String,
    pub iat: i64, // issued at timestamp
    pub exp: i64, // expiration timestamp
}

/// Caller identity taken from the bearer JWT.
///
/// Declared after path extractors in handler signatures, so a malformed
/// video ID is rejected before the token is looked at.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = get_bearer_token(&parts.headers)?;
        let user_id = validate_jwt(token, state.config.jwt_secret())?;
        Ok(AuthenticatedUser { user_id })
    }
}
