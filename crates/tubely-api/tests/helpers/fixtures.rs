//! Test fixtures: minimal PNG and MP4 blobs, and stand-ins for the media tools.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Minimal valid 1x1 PNG bytes.
pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// `ftyp` box followed by filler; the tools below never decode it.
pub fn create_test_mp4() -> Vec<u8> {
    let mut mp4 = vec![
        0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm', 0x00, 0x00, 0x02,
        0x00, b'i', b's', b'o', b'm', b'm', b'p', b'4', b'1',
    ];
    mp4.extend(std::iter::repeat(0xAB).take(4096));
    mp4
}

/// What the `ffprobe` stand-in does when run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfprobeBehavior {
    /// Report one video stream with this display aspect ratio.
    Report(&'static str),
    /// Print an error and exit 1.
    Fail,
}

/// What the `ffmpeg` stand-in does when run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfmpegBehavior {
    /// Copy the `-i` input to the output path.
    Copy,
    /// Write a partial output, then exit 1.
    Fail,
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, body).expect("Failed to write tool script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make tool script executable");
}

#[cfg(unix)]
pub fn write_ffprobe(dir: &Path, behavior: FfprobeBehavior) -> PathBuf {
    let path = dir.join("ffprobe");
    let body = match behavior {
        FfprobeBehavior::Report(display_aspect_ratio) => format!(
            "#!/bin/sh\ncat <<'JSON'\n{{\"streams\":[{{\"index\":0,\"codec_type\":\"audio\"}},{{\"index\":1,\"codec_type\":\"video\",\"width\":1920,\"height\":1080,\"display_aspect_ratio\":\"{}\"}}]}}\nJSON\n",
            display_aspect_ratio
        ),
        FfprobeBehavior::Fail => {
            "#!/bin/sh\necho 'Invalid data found when processing input' >&2\nexit 1\n".to_string()
        }
    };
    write_script(&path, &body);
    path
}

#[cfg(unix)]
pub fn write_ffmpeg(dir: &Path, behavior: FfmpegBehavior) -> PathBuf {
    let path = dir.join("ffmpeg");
    let body = match behavior {
        FfmpegBehavior::Copy => "#!/bin/sh\nin=\"\"\nwhile [ $# -gt 1 ]; do\n  if [ \"$1\" = \"-i\" ]; then in=\"$2\"; fi\n  shift\ndone\ncp \"$in\" \"$1\"\n",
        FfmpegBehavior::Fail => "#!/bin/sh\nfor last; do :; done\necho partial > \"$last\"\necho 'moov atom not found' >&2\nexit 1\n",
    };
    write_script(&path, body);
    path
}
