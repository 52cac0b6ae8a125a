//! Tubely persistence layer.

pub mod db;

pub use db::{DbError, VideoRepository};
