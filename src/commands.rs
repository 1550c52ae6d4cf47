//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the library and stream modules.
//! Each handler takes CLI args and Output, returns ExitCode.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::{
    DoctorCmd, DownloadCmd, ExitCode, InitCmd, ListCmd, Output, StatusCmd, StopCmd, StreamCmd,
};
use crate::config::Config;
use crate::library::{self, LibraryError, Prober, VideoLibrary};
use crate::models::{StreamSettings, StreamState};
use crate::net;
use crate::stream::{StreamError, StreamManager};
use crate::tools;

// =============================================================================
// Shared Helpers
// =============================================================================

/// Config for commands that can run without a config file
fn optional_config(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match Config::load_from(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "ignoring unreadable config");
            Config::default()
        }
    }
}

fn library_for(config: &Config) -> VideoLibrary {
    VideoLibrary::new(library::VIDEO_DIR).with_prober(Prober::with_path(config.ffprobe_bin()))
}

fn manager_for(config: &Config) -> StreamManager {
    StreamManager::new().with_encoder(config.ffmpeg_bin())
}

/// Map library failures to exit codes
fn library_exit_code(e: &LibraryError) -> ExitCode {
    match e {
        LibraryError::NoLibrary(_) => ExitCode::NotFound,
        LibraryError::AlreadyExists(_) => ExitCode::AlreadyExists,
        LibraryError::InvalidName(_) => ExitCode::InvalidArgs,
        LibraryError::Download(_) => ExitCode::NetworkError,
        LibraryError::Io(_) => ExitCode::Error,
    }
}

/// Map stream failures to exit codes
fn stream_exit_code(e: &StreamError) -> ExitCode {
    match e {
        StreamError::NotRunning | StreamError::ProcessNotFound(_) => ExitCode::NotRunning,
        StreamError::VideoNotFound(_) => ExitCode::NotFound,
        StreamError::EncoderNotFound(_) => ExitCode::ToolMissing,
        StreamError::InvalidPidFile(_)
        | StreamError::SpawnFailed(_)
        | StreamError::EncoderExited
        | StreamError::Io(_) => ExitCode::Error,
    }
}

#[derive(Serialize)]
struct ActionOk {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
}

// =============================================================================
// List Command
// =============================================================================

pub async fn list_cmd(_cmd: ListCmd, config_path: &Path, output: &Output) -> ExitCode {
    let config = optional_config(config_path);
    let library = library_for(&config);

    match library.list().await {
        Ok(videos) => {
            let human = if videos.is_empty() {
                format!("No videos in {}/", library.dir().display())
            } else {
                videos
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            };

            if let Err(e) = output.print(&videos, human) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(e.to_string(), library_exit_code(&e)),
    }
}

// =============================================================================
// Download Command
// =============================================================================

pub async fn download_cmd(cmd: DownloadCmd, config_path: &Path, output: &Output) -> ExitCode {
    let config = optional_config(config_path);
    let library = library_for(&config);

    output.info(format!("Downloading {} ...", cmd.url));

    match library.download(&cmd.url, &cmd.name).await {
        Ok(downloaded) => {
            #[derive(Serialize)]
            struct DownloadSuccess {
                status: &'static str,
                name: String,
                path: PathBuf,
                bytes: u64,
            }

            let response = DownloadSuccess {
                status: "downloaded",
                name: cmd.name.clone(),
                path: downloaded.path,
                bytes: downloaded.bytes,
            };
            let human = format!("Downloaded {}.{}", cmd.name, library::VIDEO_EXT);

            if let Err(e) = output.print(&response, human) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(e.to_string(), library_exit_code(&e)),
    }
}

// =============================================================================
// Stream Command
// =============================================================================

pub async fn stream_cmd(cmd: StreamCmd, config_path: &Path, output: &Output) -> ExitCode {
    let config = match Config::load_from(config_path) {
        Ok(config) => config,
        Err(e) => {
            return output.error(
                format!("{:#}. Run `rtsp-streamer init` to create one.", e),
                ExitCode::Error,
            )
        }
    };

    if let Err(e) = library::validate_name(&cmd.video) {
        return output.error(e.to_string(), ExitCode::InvalidArgs);
    }

    let settings = StreamSettings::merge(
        cmd.fps,
        cmd.resolution,
        cmd.bitrate,
        cmd.loop_video,
        &config.stream,
    );

    let library = library_for(&config);
    let input = library.video_path(&cmd.video);
    let manager = manager_for(&config);

    match manager
        .start(&input, &settings, &net::publish_url(&config.rtsp))
        .await
    {
        Ok(started) => {
            if let Some(old) = started.replaced {
                output.info(format!("Stopped previous stream (pid {}).", old));
            }

            #[derive(Serialize)]
            struct StreamSuccess {
                status: &'static str,
                video: String,
                pid: u32,
                url: String,
                settings: StreamSettings,
            }

            let url = net::viewer_url(&config.rtsp);
            let human = format!("Stream started at {}", url);
            let response = StreamSuccess {
                status: "streaming",
                video: cmd.video,
                pid: started.pid,
                url,
                settings,
            };

            if let Err(e) = output.print(&response, human) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(e.to_string(), stream_exit_code(&e)),
    }
}

// =============================================================================
// Stop / Status Commands
// =============================================================================

pub async fn stop_cmd(_cmd: StopCmd, config_path: &Path, output: &Output) -> ExitCode {
    let manager = manager_for(&optional_config(config_path));

    match manager.stop() {
        Ok(pid) => {
            let response = ActionOk {
                status: "stopped",
                pid: Some(pid),
            };
            if let Err(e) = output.print(&response, "Stream stopped.") {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(e.to_string(), stream_exit_code(&e)),
    }
}

pub async fn status_cmd(_cmd: StatusCmd, config_path: &Path, output: &Output) -> ExitCode {
    let config = optional_config(config_path);
    let manager = manager_for(&config);

    match manager.status() {
        Ok(state) => {
            let human = match state {
                StreamState::Running(_) => {
                    format!("{} Serving {}", state, net::viewer_url(&config.rtsp))
                }
                _ => state.to_string(),
            };
            if let Err(e) = output.print(&state, human) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(e.to_string(), stream_exit_code(&e)),
    }
}

// =============================================================================
// Doctor Command
// =============================================================================

pub async fn doctor_cmd(_cmd: DoctorCmd, config_path: &Path, output: &Output) -> ExitCode {
    output.info("Running installation checks...");

    let checks = tools::run_checks(config_path, Path::new(library::VIDEO_DIR)).await;
    let all_ok = checks.iter().all(|c| c.ok);

    let mut human = checks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    human.push_str(if all_ok {
        "\n\nAll checks passed."
    } else {
        "\n\nSome checks failed. Please fix the issues above."
    });

    if let Err(e) = output.print(&checks, human) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }

    if all_ok {
        ExitCode::Success
    } else {
        ExitCode::Error
    }
}

// =============================================================================
// Init Command
// =============================================================================

/// Write the default config. Returns `Ok(false)` if a file is there and
/// `force` is off.
fn write_default_config(path: &Path, force: bool) -> anyhow::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    Config::default().save(path)?;
    Ok(true)
}

pub async fn init_cmd(cmd: InitCmd, config_path: &Path, output: &Output) -> ExitCode {
    match write_default_config(config_path, cmd.force) {
        Ok(true) => {}
        Ok(false) => {
            return output.error(
                format!(
                    "{} already exists. Use --force to overwrite.",
                    config_path.display()
                ),
                ExitCode::AlreadyExists,
            )
        }
        Err(e) => return output.error(format!("{:#}", e), ExitCode::Error),
    }

    if let Err(e) = std::fs::create_dir_all(library::VIDEO_DIR) {
        tracing::warn!(error = %e, "could not create video directory");
    }

    #[derive(Serialize)]
    struct InitSuccess {
        status: &'static str,
        path: PathBuf,
    }

    let response = InitSuccess {
        status: "created",
        path: config_path.to_path_buf(),
    };
    let human = format!("Wrote default config to {}", config_path.display());
    if let Err(e) = output.print(&response, human) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}
