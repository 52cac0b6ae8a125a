pub mod jwt;
pub mod models;

pub use jwt::{get_bearer_token, make_jwt, validate_jwt};
pub use models::{AuthenticatedUser, JwtClaims};
