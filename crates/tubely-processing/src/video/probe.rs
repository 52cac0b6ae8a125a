//! Aspect-ratio classification through `ffprobe`.

use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;
use tubely_core::models::AspectRatio;

use super::command::{run_tool, stderr_excerpt, validate_tool_path, ToolError};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("invalid probe output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    display_aspect_ratio: Option<String>,
}

/// Classify raw `ffprobe -print_format json -show_streams` output.
///
/// The first video stream decides; a missing stream or ratio is `Other`.
pub fn classify_probe_output(stdout: &[u8]) -> Result<AspectRatio, serde_json::Error> {
    let output: ProbeOutput = serde_json::from_slice(stdout)?;
    let ratio = output
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"))
        .and_then(|stream| stream.display_aspect_ratio.as_deref())
        .unwrap_or_default();
    Ok(AspectRatio::from_display_ratio(ratio))
}

#[derive(Debug, Clone)]
pub struct VideoProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl VideoProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    /// Probe a local file and bucket its display aspect ratio. The file is only read.
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn aspect_ratio(&self, path: &Path) -> Result<AspectRatio, ProbeError> {
        let start = std::time::Instant::now();

        validate_tool_path(&self.ffprobe_path).map_err(|msg| ProbeError::Spawn {
            program: self.ffprobe_path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, msg),
        })?;

        let args: [&OsStr; 6] = [
            "-v".as_ref(),
            "error".as_ref(),
            "-print_format".as_ref(),
            "json".as_ref(),
            "-show_streams".as_ref(),
            path.as_os_str(),
        ];

        let output = run_tool(&self.ffprobe_path, args, self.timeout)
            .await
            .map_err(|e| match e {
                ToolError::Spawn(source) => ProbeError::Spawn {
                    program: self.ffprobe_path.clone(),
                    source,
                },
                ToolError::TimedOut => ProbeError::TimedOut {
                    program: self.ffprobe_path.clone(),
                    timeout: self.timeout,
                },
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                program: self.ffprobe_path.clone(),
                status: output.status,
                stderr: stderr_excerpt(&output),
            });
        }

        let aspect_ratio = classify_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            aspect_ratio = %aspect_ratio,
            "Video probe completed"
        );

        Ok(aspect_ratio)
    }
}
