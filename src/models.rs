//! Data structures shared across rtsp-streamer
//!
//! - **Library**: video files and their probed metadata
//! - **Stream**: encoder settings and stream state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::config::StreamDefaults;

// =============================================================================
// Library Models
// =============================================================================

/// Basic video metadata read with ffprobe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

impl VideoInfo {
    /// Short resolution label, e.g. "720p"
    pub fn resolution_label(&self) -> String {
        format!("{}p", self.height)
    }
}

/// A video in the local library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEntry {
    /// File name including extension, e.g. "intro.mp4"
    pub file_name: String,
    pub path: PathBuf,
    pub info: VideoInfo,
}

impl fmt::Display for VideoEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {:.2}fps)",
            self.file_name,
            self.info.resolution_label(),
            self.info.fps
        )
    }
}

// =============================================================================
// Stream Models
// =============================================================================

/// Encoder settings for one stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSettings {
    pub fps: Option<f64>,
    pub resolution: Option<String>,
    pub bitrate: Option<String>,
    pub loop_video: bool,
}

impl StreamSettings {
    /// Merge explicit options over config defaults.
    ///
    /// `--loop` is a plain flag, so it can only switch looping on; a config
    /// default of `loop: true` is kept when the flag is absent.
    pub fn merge(
        fps: Option<f64>,
        resolution: Option<String>,
        bitrate: Option<String>,
        loop_video: bool,
        defaults: &StreamDefaults,
    ) -> Self {
        Self {
            fps: fps.or(defaults.fps),
            resolution: resolution.or_else(|| defaults.resolution.clone()),
            bitrate: bitrate.or_else(|| defaults.bitrate.clone()),
            loop_video: loop_video || defaults.loop_video,
        }
    }
}

/// State of the tracked encoder process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "pid", rename_all = "lowercase")]
pub enum StreamState {
    /// No PID record
    Idle,
    /// Record exists and the process is alive
    Running(u32),
    /// Record exists but the process is gone
    Stale(u32),
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamState::Idle => write!(f, "No stream is running."),
            StreamState::Running(pid) => write!(f, "Stream running (pid {}).", pid),
            StreamState::Stale(pid) => {
                write!(f, "Stream process {} not found (stale pid file).", pid)
            }
        }
    }
}
