//! Bounded execution of external tools.

use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug)]
pub(crate) enum ToolError {
    Spawn(std::io::Error),
    TimedOut,
}

/// Validate that a tool path doesn't contain shell metacharacters
pub(crate) fn validate_tool_path(path: &str) -> Result<(), String> {
    const DANGEROUS_CHARS: [char; 11] = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() {
        return Err("tool path is empty".to_string());
    }
    if path.chars().any(|c| DANGEROUS_CHARS.contains(&c)) {
        return Err(format!("tool path contains dangerous characters: {}", path));
    }
    Ok(())
}

/// Run `program` to completion, capturing stdout and stderr.
///
/// The child is killed if the timeout fires or the calling future is dropped.
pub(crate) async fn run_tool<I, S>(
    program: &str,
    args: I,
    timeout: Duration,
) -> Result<Output, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(ToolError::Spawn)?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(ToolError::Spawn),
        Err(_) => Err(ToolError::TimedOut),
    }
}

pub(crate) fn stderr_excerpt(output: &Output) -> String {
    const MAX_STDERR_CHARS: usize = 2048;
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.chars().count() > MAX_STDERR_CHARS {
        trimmed.chars().take(MAX_STDERR_CHARS).collect()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_shell_metacharacters() {
        assert!(validate_tool_path("ffprobe").is_ok());
        assert!(validate_tool_path("/usr/local/bin/ffmpeg").is_ok());
        assert!(validate_tool_path("ffprobe; rm -rf /").is_err());
        assert!(validate_tool_path("$(whoami)").is_err());
        assert!(validate_tool_path("").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn times_out_long_running_tools() {
        let result = run_tool("sleep", ["5"], Duration::from_millis(50)).await;
        assert!(matches!(result, Err(ToolError::TimedOut)));
    }

    #[tokio::test]
    async fn reports_missing_binaries_as_spawn_errors() {
        let result = run_tool(
            "tubely-definitely-not-installed",
            ["-version"],
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(ToolError::Spawn(_))));
    }
}
