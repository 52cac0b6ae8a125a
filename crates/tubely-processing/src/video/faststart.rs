//! Fast-start remux through `ffmpeg`: the `moov` atom is moved to the front
//! of the file so playback can begin before the download finishes.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;
use tubely_core::constants::FASTSTART_SUFFIX;

use super::command::{run_tool, stderr_excerpt, validate_tool_path, ToolError};

#[derive(Debug, Error)]
pub enum RemuxError {
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

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

#[derive(Debug, Clone)]
pub struct FastStartRemuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FastStartRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }

    /// `<input>.processing`, where [`remux`](Self::remux) writes its output.
    pub fn output_path(input: &Path) -> PathBuf {
        let mut output: OsString = input.as_os_str().to_owned();
        output.push(FASTSTART_SUFFIX);
        PathBuf::from(output)
    }

    /// Stream-copy `input` into a fast-start MP4 next to it and return the new path.
    ///
    /// Both files belong to the caller afterwards, including a partial output
    /// left behind by a failed run.
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    pub async fn remux(&self, input: &Path) -> Result<PathBuf, RemuxError> {
        let start = std::time::Instant::now();
        let output_path = Self::output_path(input);

        validate_tool_path(&self.ffmpeg_path).map_err(|msg| RemuxError::Spawn {
            program: self.ffmpeg_path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, msg),
        })?;

        let args: [&OsStr; 12] = [
            "-y".as_ref(),
            "-v".as_ref(),
            "error".as_ref(),
            "-i".as_ref(),
            input.as_os_str(),
            "-c".as_ref(),
            "copy".as_ref(),
            "-movflags".as_ref(),
            "faststart".as_ref(),
            "-f".as_ref(),
            "mp4".as_ref(),
            output_path.as_os_str(),
        ];

        let output = run_tool(&self.ffmpeg_path, args, self.timeout)
            .await
            .map_err(|e| match e {
                ToolError::Spawn(source) => RemuxError::Spawn {
                    program: self.ffmpeg_path.clone(),
                    source,
                },
                ToolError::TimedOut => RemuxError::TimedOut {
                    program: self.ffmpeg_path.clone(),
                    timeout: self.timeout,
                },
            })?;

        if !output.status.success() {
            return Err(RemuxError::Failed {
                program: self.ffmpeg_path.clone(),
                status: output.status,
                stderr: stderr_excerpt(&output),
            });
        }

        tracing::info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            output = %output_path.display(),
            "Fast-start remux completed"
        );

        Ok(output_path)
    }
}
