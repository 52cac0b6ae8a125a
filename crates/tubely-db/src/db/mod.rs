//! Repositories for the data access layer
//!
//! Records live in a single JSON document on disk. Each repository serialises
//! its writers and replaces the document atomically.

pub mod video;

pub use video::VideoRepository;

use tubely_core::AppError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database document is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(Uuid),
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Database(err.to_string())
    }
}
