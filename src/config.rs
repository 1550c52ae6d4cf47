//! Configuration management for rtsp-streamer
//!
//! Handles config file loading/saving and streaming defaults.
//! Config is read from ./config.yaml, falling back to
//! ~/.config/rtsp-streamer/config.yaml when no local file exists.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name looked up in the working directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Streaming defaults used when `stream` options are omitted
    pub stream: StreamDefaults,
    /// RTSP server the encoder publishes to
    pub rtsp: RtspConfig,
    /// Encoder binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg: Option<String>,
    /// Metadata probe binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffprobe: Option<String>,
}

/// Default encoding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamDefaults {
    pub fps: Option<f64>,
    pub resolution: Option<String>,
    pub bitrate: Option<String>,
    #[serde(rename = "loop")]
    pub loop_video: bool,
}

impl Default for StreamDefaults {
    fn default() -> Self {
        Self {
            fps: Some(30.0),
            resolution: Some("1280x720".to_string()),
            bitrate: Some("2M".to_string()),
            loop_video: false,
        }
    }
}

/// RTSP server address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtspConfig {
    pub host: String,
    pub port: u16,
    /// Mount path on the server (without leading slash)
    pub path: String,
}

impl Default for RtspConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8554,
            path: "stream0".to_string(),
        }
    }
}

impl Config {
    /// Per-user config path (~/.config/rtsp-streamer/config.yaml)
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rtsp-streamer").join(CONFIG_FILE))
    }

    /// Resolve which config file to use.
    ///
    /// An explicit path always wins. Otherwise ./config.yaml is used if it
    /// exists, then the per-user file, and finally ./config.yaml again so
    /// error messages name the expected location.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return local;
        }

        Self::user_path()
            .filter(|p| p.exists())
            .unwrap_or(local)
    }

    /// Load config from a YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        Self::from_yaml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse config from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a mapping
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Could not write config file {}", path.display()))?;
        Ok(())
    }

    /// Encoder binary, defaulting to `ffmpeg` on PATH
    pub fn ffmpeg_bin(&self) -> &str {
        self.ffmpeg.as_deref().unwrap_or("ffmpeg")
    }

    /// Probe binary, defaulting to `ffprobe` on PATH
    pub fn ffprobe_bin(&self) -> &str {
        self.ffprobe.as_deref().unwrap_or("ffprobe")
    }
}
