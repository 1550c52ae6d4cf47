//! Video metadata via ffprobe
//!
//! Reads frame rate and dimensions of the first video stream. Nothing is
//! cached; every call runs ffprobe again.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;

use crate::models::VideoInfo;

/// Default probe binary
pub const FFPROBE: &str = "ffprobe";

/// Errors from probing a video file
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("'{0}' not found. Install ffmpeg first.")]
    ToolNotFound(String),
    #[error("ffprobe failed on {}: {message}", .path.display())]
    Failed { path: PathBuf, message: String },
    #[error("No video stream in {}", .0.display())]
    NoVideoStream(PathBuf),
    #[error("Unreadable ffprobe output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
}

/// ffprobe wrapper
#[derive(Debug, Clone)]
pub struct Prober {
    ffprobe_path: String,
}

impl Prober {
    /// Create a prober using `ffprobe` on PATH
    pub fn new() -> Self {
        Self {
            ffprobe_path: FFPROBE.to_string(),
        }
    }

    /// Create with custom ffprobe path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: path.into(),
        }
    }

    /// Read frame rate and dimensions of `path`
    pub async fn probe(&self, path: &Path) -> Result<VideoInfo, ProbeError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::ToolNotFound(self.ffprobe_path.clone())
                } else {
                    ProbeError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::Failed {
                path: path.to_path_buf(),
                message: stderr.trim().to_string(),
            });
        }

        parse_ffprobe_output(path, &String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract [`VideoInfo`] from ffprobe's JSON output
pub fn parse_ffprobe_output(path: &Path, json: &str) -> Result<VideoInfo, ProbeError> {
    let output: FfprobeOutput = serde_json::from_str(json)?;

    let stream = output
        .streams
        .into_iter()
        .find(|s| s.codec_type.as_deref().map_or(true, |t| t == "video"))
        .ok_or_else(|| ProbeError::NoVideoStream(path.to_path_buf()))?;

    // avg_frame_rate is "0/0" for some containers; fall back to r_frame_rate
    let fps = [stream.avg_frame_rate, stream.r_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|rate| parse_frame_rate(&rate).filter(|f| *f > 0.0))
        .unwrap_or(0.0);

    Ok(VideoInfo {
        fps,
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
    })
}

/// Parse "30000/1001" or "25" into frames per second
fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num, den)) = rate.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        return (den != 0.0).then(|| num / den);
    }
    rate.trim().parse().ok()
}
