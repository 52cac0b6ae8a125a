//! Telemetry initialization
//!
//! Logs go to stdout through `tracing-subscriber`, either as human-readable
//! lines or as JSON objects for log shippers.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, LogFormat};
