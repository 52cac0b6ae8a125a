use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::OBJECT_REFERENCE_SEPARATOR;

/// Caller-supplied fields of a video, carried through every update unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateVideoParams {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(flatten)]
    pub params: CreateVideoParams,
}

impl Video {
    pub fn new(user_id: Uuid, params: CreateVideoParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: None,
            params,
        }
    }

    /// Only the owning user may change a video's upload fields.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Composite `bucket,key` reference stored on a video until it is signed at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReference {
    pub bucket: String,
    pub key: String,
}

impl ObjectReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl Display for ObjectReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}{}", self.bucket, OBJECT_REFERENCE_SEPARATOR, self.key)
    }
}

impl FromStr for ObjectReference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Signed and public URLs never contain the separator before their scheme.
        if s.contains("://") {
            return Err(anyhow::anyhow!("Not an object reference: {}", s));
        }
        match s.split_once(OBJECT_REFERENCE_SEPARATOR) {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
                Ok(ObjectReference::new(bucket, key))
            }
            _ => Err(anyhow::anyhow!("Malformed object reference: {}", s)),
        }
    }
}
