//! External tool and installation checks
//!
//! Backs the `doctor` command: is ffmpeg/ffprobe/mediamtx installed, does the
//! config file load, does the video directory exist.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Serialize;
use tokio::process::Command;

use crate::config::Config;

/// Information about an external tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of the tool's version output
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// One line of the doctor report
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

impl Check {
    fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: true,
            detail: detail.into(),
        }
    }

    fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: false,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = if self.ok { "✅" } else { "❌" };
        write!(f, "{} {}: {}", mark, self.name, self.detail)
    }
}

/// Probe a tool by running it with `version_arg`
pub async fn check_tool(name: &str, version_arg: &str) -> ToolInfo {
    let result = Command::new(name)
        .arg(version_arg)
        .stdin(Stdio::null())
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {
            // mediamtx prints its version to stderr
            let text = if output.stdout.is_empty() {
                output.stderr
            } else {
                output.stdout
            };
            let version = String::from_utf8_lossy(&text)
                .lines()
                .next()
                .map(|s| s.trim().to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: which::which(name).ok(),
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

fn tool_check(label: &str, info: ToolInfo) -> Check {
    if info.available {
        let version = info.version.unwrap_or_else(|| "installed".to_string());
        Check::pass(label, version)
    } else {
        Check::fail(label, format!("'{}' is not installed", info.name))
    }
}

/// Run every installation check
pub async fn run_checks(config_path: &Path, video_dir: &Path) -> Vec<Check> {
    // Tools come from the config when it loads; otherwise the defaults
    let config = Config::load_from(config_path);
    let (ffmpeg, ffprobe) = match &config {
        Ok(c) => (c.ffmpeg_bin().to_string(), c.ffprobe_bin().to_string()),
        Err(_) => ("ffmpeg".to_string(), "ffprobe".to_string()),
    };

    let mut checks = vec![
        tool_check("ffmpeg", check_tool(&ffmpeg, "-version").await),
        tool_check("ffprobe", check_tool(&ffprobe, "-version").await),
        tool_check("mediamtx", check_tool("mediamtx", "--version").await),
    ];

    checks.push(match config {
        Ok(_) => Check::pass("config", config_path.display().to_string()),
        Err(e) => Check::fail("config", format!("{:#}", e)),
    });

    checks.push(if video_dir.is_dir() {
        Check::pass("videos", video_dir.display().to_string())
    } else {
        Check::fail("videos", format!("missing directory {}", video_dir.display()))
    });

    checks
}
