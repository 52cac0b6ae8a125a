//! Video processing module

mod command;
pub mod faststart;
pub mod probe;

pub use faststart::{FastStartRemuxer, RemuxError};
pub use probe::{classify_probe_output, ProbeError, VideoProber};
