//! Shared key generation and validation for storage backends.
//!
//! Key format: `/<prefix>/<hex>.mp4`, where `<hex>` is 32 random bytes
//! hex-encoded.

use tubely_core::models::AspectRatio;

use crate::traits::{StorageError, StorageResult};

/// Number of random bytes behind every generated object name.
pub const OBJECT_NAME_BYTES: usize = 32;

/// 64 lowercase hex characters drawn from the thread-local CSPRNG.
pub fn generate_object_name() -> String {
    let bytes: [u8; OBJECT_NAME_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Key a video of the given aspect ratio is uploaded under.
pub fn video_key(aspect_ratio: AspectRatio, object_name: &str) -> String {
    format!("{}{}.mp4", aspect_ratio.storage_prefix(), object_name)
}

/// Strip the leading `/` and reject keys that could escape their root.
pub fn normalize_key(storage_key: &str) -> StorageResult<&str> {
    let key = storage_key.trim_start_matches('/');
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.split('/').any(|segment| segment == "..") || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_names_are_64_hex_chars() {
        let name = generate_object_name();
        assert_eq!(name.len(), 64);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(name, generate_object_name());
    }

    #[test]
    fn video_keys_use_ratio_prefix() {
        let name = "ab".repeat(32);
        assert_eq!(
            video_key(AspectRatio::Landscape, &name),
            format!("/landscape/{}.mp4", name)
        );
        assert_eq!(
            video_key(AspectRatio::Portrait, &name),
            format!("/portrait/{}.mp4", name)
        );
        assert_eq!(
            video_key(AspectRatio::Other, &name),
            format!("/other/{}.mp4", name)
        );
    }

    #[test]
    fn normalize_strips_leading_slash() {
        assert_eq!(
            normalize_key("/landscape/a.mp4").unwrap(),
            "landscape/a.mp4"
        );
        assert_eq!(normalize_key("a.png").unwrap(), "a.png");
    }

    #[test]
    fn normalize_rejects_traversal_and_empty() {
        assert!(matches!(
            normalize_key("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            normalize_key("/other/../../x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(normalize_key("/"), Err(StorageError::InvalidKey(_))));
    }
}
