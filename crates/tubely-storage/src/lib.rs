//! Tubely Storage Library
//!
//! This crate provides the object storage abstraction used for uploaded
//! videos and on-disk thumbnails, with an S3 implementation (through
//! `object_store`) and a local filesystem implementation.
//!
//! # Storage key format
//!
//! Video keys are written as `/<prefix>/<64 hex chars>.mp4`, where the prefix
//! is derived from the video's aspect ratio (`landscape`, `portrait`, `other`).
//! The leading `/` is part of the key handed around the application and
//! stored in `bucket,key` references; backends strip it before touching the
//! underlying store. Keys must not contain `..`. See the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use factory::create_assets_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
