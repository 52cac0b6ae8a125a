//! Tubely Media Processing Library
//!
//! Wrappers around the external `ffprobe` and `ffmpeg` tools used while a
//! video upload is being handled.

pub mod video;

// Re-export commonly used types
pub use video::{
    classify_probe_output, FastStartRemuxer, ProbeError, RemuxError, VideoProber,
};
