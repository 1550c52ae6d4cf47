//! CLI - Command Line Interface for rtsp-streamer
//!
//! Every command prints a human-readable line by default and a JSON
//! document with `--json` (or when stdout is not a terminal).
//!
//! # Examples
//!
//! ```bash
//! # Fill the library
//! rtsp-streamer download --url https://example.com/clip.mp4 --name clip
//! rtsp-streamer list
//!
//! # Stream it, then stop
//! rtsp-streamer stream --video clip --fps 25 --resolution 1280x720 --loop
//! rtsp-streamer stop
//! ```

use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::OnceLock;

use clap::{Args, Parser, Subcommand};
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Video or library directory not found
    NotFound = 4,
    /// No stream running (or its process is gone)
    NotRunning = 5,
    /// Download destination already exists
    AlreadyExists = 6,
    /// ffmpeg/ffprobe missing
    ToolMissing = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// rtsp-streamer - re-stream local videos over RTSP
#[derive(Parser, Debug)]
#[command(
    name = "rtsp-streamer",
    version,
    about = "Download videos and re-stream them over RTSP with ffmpeg",
    long_about = "Keeps a local library of .mp4 files and publishes one of them \
                  to an RTSP server (e.g. MediaMTX) through ffmpeg.\n\n\
                  Only one stream runs at a time; its process id is kept in \
                  stream.pid so a later `stop` can end it.",
    after_help = "EXAMPLES:\n\
                  rtsp-streamer list                         List local videos\n\
                  rtsp-streamer download --url URL --name x  Download x.mp4\n\
                  rtsp-streamer stream --video x --loop      Stream x.mp4 in a loop\n\
                  rtsp-streamer stop                         Stop the stream"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to config file (default: ./config.yaml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available videos in the local library
    #[command(visible_alias = "ls")]
    List(ListCmd),

    /// Download a video from a URL
    #[command(visible_alias = "dl")]
    Download(DownloadCmd),

    /// Start streaming a video via RTSP
    Stream(StreamCmd),

    /// Stop the current stream
    Stop(StopCmd),

    /// Show whether a stream is running
    Status(StatusCmd),

    /// Check that ffmpeg, ffprobe, mediamtx and the config are in place
    Doctor(DoctorCmd),

    /// Write a default config file
    Init(InitCmd),
}

/// List videos in the library with resolution and frame rate
#[derive(Args, Debug)]
pub struct ListCmd {}

/// Download a video into the library
#[derive(Args, Debug)]
pub struct DownloadCmd {
    /// URL of the video to download
    #[arg(long, required = true)]
    pub url: String,

    /// Name to save the video as (without .mp4)
    #[arg(long, required = true)]
    pub name: String,
}

/// Stream a library video to the configured RTSP server
#[derive(Args, Debug)]
pub struct StreamCmd {
    /// Name of the video to stream (without .mp4)
    #[arg(long, required = true)]
    pub video: String,

    /// Frame rate for streaming
    #[arg(long)]
    pub fps: Option<f64>,

    /// Resolution (e.g., 1280x720)
    #[arg(long)]
    pub resolution: Option<String>,

    /// Bitrate (e.g., 2M)
    #[arg(long)]
    pub bitrate: Option<String>,

    /// Loop the video continuously
    #[arg(long = "loop")]
    pub loop_video: bool,
}

/// Stop the running stream
#[derive(Args, Debug)]
pub struct StopCmd {}

/// Report the state of the stream
#[derive(Args, Debug)]
pub struct StatusCmd {}

/// Run installation checks
#[derive(Args, Debug)]
pub struct DoctorCmd {}

/// Create a config file with default settings
#[derive(Args, Debug)]
pub struct InitCmd {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print a result: `data` as JSON, or `human` as text
    pub fn print<T: Serialize>(&self, data: &T, human: impl fmt::Display) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", human);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Argument Validation
// =============================================================================

fn resolution_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[1-9]\d*x[1-9]\d*$").expect("valid regex"))
}

fn bitrate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)?[kKmMgG]?$").expect("valid regex"))
}

/// Validate resolution format (WIDTHxHEIGHT)
pub fn validate_resolution(value: &str) -> Result<&str, &'static str> {
    if resolution_re().is_match(value) {
        Ok(value)
    } else {
        Err("Invalid resolution (expected WIDTHxHEIGHT, e.g. 1280x720)")
    }
}

/// Validate bitrate format (number with optional k/M/G suffix)
pub fn validate_bitrate(value: &str) -> Result<&str, &'static str> {
    if bitrate_re().is_match(value) {
        Ok(value)
    } else {
        Err("Invalid bitrate (expected a number with optional k/M/G suffix, e.g. 2M)")
    }
}

/// Validate frame rate (positive, finite)
pub fn validate_fps(value: f64) -> Result<f64, &'static str> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err("Invalid frame rate (expected a positive number)")
    }
}

impl StreamCmd {
    /// Check every explicit option before anything is stopped or started
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(fps) = self.fps {
            validate_fps(fps)?;
        }
        if let Some(resolution) = &self.resolution {
            validate_resolution(resolution)?;
        }
        if let Some(bitrate) = &self.bitrate {
            validate_bitrate(bitrate)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Verify CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["rtsp-streamer"]).is_err());
    }

    #[test]
    fn test_stream_command() {
        let cli = Cli::parse_from([
            "rtsp-streamer",
            "stream",
            "--video",
            "demo",
            "--fps",
            "25",
            "--resolution",
            "640x360",
            "--loop",
        ]);
        if let Command::Stream(cmd) = cli.command {
            assert_eq!(cmd.video, "demo");
            assert_eq!(cmd.fps, Some(25.0));
            assert_eq!(cmd.resolution.as_deref(), Some("640x360"));
            assert!(cmd.bitrate.is_none());
            assert!(cmd.loop_video);
        } else {
            panic!("Expected Stream command");
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "rtsp-streamer",
            "--json",
            "--quiet",
            "--config",
            "/etc/rtsp.yaml",
            "stop",
        ]);
        assert!(cli.json);
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/rtsp.yaml")));
        assert!(matches!(cli.command, Command::Stop(_)));
    }

    #[test]
    fn test_validate_resolution() {
        assert!(validate_resolution("1280x720").is_ok());
        assert!(validate_resolution("640x360").is_ok());
        assert!(validate_resolution("1280X720").is_err());
        assert!(validate_resolution("0x720").is_err());
        assert!(validate_resolution("720p").is_err());
        assert!(validate_resolution("").is_err());
    }

    #[test]
    fn test_validate_bitrate() {
        assert!(validate_bitrate("2M").is_ok());
        assert!(validate_bitrate("500k").is_ok());
        assert!(validate_bitrate("1.5M").is_ok());
        assert!(validate_bitrate("4000000").is_ok());
        assert!(validate_bitrate("fast").is_err());
        assert!(validate_bitrate("2MB").is_err());
    }

    #[test]
    fn test_validate_fps() {
        assert!(validate_fps(30.0).is_ok());
        assert!(validate_fps(29.97).is_ok());
        assert!(validate_fps(0.0).is_err());
        assert!(validate_fps(-1.0).is_err());
        assert!(validate_fps(f64::NAN).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::Error), 1);
        assert_eq!(i32::from(ExitCode::InvalidArgs), 2);
        assert_eq!(i32::from(ExitCode::NetworkError), 3);
        assert_eq!(i32::from(ExitCode::NotFound), 4);
        assert_eq!(i32::from(ExitCode::NotRunning), 5);
        assert_eq!(i32::from(ExitCode::AlreadyExists), 6);
        assert_eq!(i32::from(ExitCode::ToolMissing), 7);
    }
}
