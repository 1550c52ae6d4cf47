//! Stream lifecycle: one ffmpeg process at a time
//!
//! The running encoder is tracked only through the PID file, so a later
//! invocation of the CLI can find and stop it.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use super::encoder::{self, FFMPEG};
use super::pidfile::PidFile;
use super::process;
use crate::models::{StreamSettings, StreamState};

/// Default encoder log, relative to the working directory
pub const LOG_FILE: &str = "stream.log";

/// Errors from stream lifecycle operations
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("No stream is running.")]
    NotRunning,
    #[error("Stream process {0} not found.")]
    ProcessNotFound(u32),
    #[error("Invalid pid file contents: {0:?}")]
    InvalidPidFile(String),
    #[error("Video {} does not exist.", .0.display())]
    VideoNotFound(PathBuf),
    #[error("Encoder '{0}' not found. Install ffmpeg first.")]
    EncoderNotFound(String),
    #[error("Failed to start encoder: {0}")]
    SpawnFailed(io::Error),
    #[error("Encoder exited before its pid could be recorded")]
    EncoderExited,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A freshly started stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartedStream {
    pub pid: u32,
    /// PID of the stream that was stopped to make room, if any
    pub replaced: Option<u32>,
}

/// Starts, stops and inspects the single encoder process
#[derive(Debug, Clone)]
pub struct StreamManager {
    pid_file: PidFile,
    log_path: PathBuf,
    encoder: String,
}

impl StreamManager {
    /// Manager using the default PID file, log file and `ffmpeg` on PATH
    pub fn new() -> Self {
        Self {
            pid_file: PidFile::default(),
            log_path: PathBuf::from(LOG_FILE),
            encoder: FFMPEG.to_string(),
        }
    }

    /// Keep the PID record (and the log next to it) at a custom path
    pub fn with_pid_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.log_path = path.with_extension("log");
        self.pid_file = PidFile::new(path);
        self
    }

    /// Use a custom encoder binary
    pub fn with_encoder(mut self, encoder: impl Into<String>) -> Self {
        self.encoder = encoder.into();
        self
    }

    pub fn pid_file(&self) -> &PidFile {
        &self.pid_file
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Start streaming `input` to `destination`.
    ///
    /// Any stream already recorded is stopped first, even if `input` turns
    /// out not to exist.
    pub async fn start(
        &self,
        input: &Path,
        settings: &StreamSettings,
        destination: &str,
    ) -> Result<StartedStream, StreamError> {
        let replaced = self.stop_previous()?;

        if !input.is_file() {
            return Err(StreamError::VideoNotFound(input.to_path_buf()));
        }

        let args = encoder::build_args(input, settings, destination);
        tracing::debug!(encoder = %self.encoder, ?args, "spawning encoder");

        let log = std::fs::File::create(&self.log_path)?;
        let mut cmd = Command::new(&self.encoder);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(log.try_clone()?)
            .stderr(log);
        process::detach(&mut cmd);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StreamError::EncoderNotFound(self.encoder.clone())
            } else {
                StreamError::SpawnFailed(e)
            }
        })?;

        let pid = child.id().ok_or(StreamError::EncoderExited)?;
        if let Err(e) = self.pid_file.write(pid) {
            // An unrecorded encoder could never be stopped again
            let _ = child.start_kill();
            return Err(e.into());
        }

        tracing::info!(pid, input = %input.display(), destination, "stream started");
        Ok(StartedStream { pid, replaced })
    }

    /// Stop the recorded stream, returning its PID
    pub fn stop(&self) -> Result<u32, StreamError> {
        let pid = match self.pid_file.read() {
            Ok(Some(pid)) => pid,
            Ok(None) => return Err(StreamError::NotRunning),
            Err(e @ StreamError::InvalidPidFile(_)) => {
                self.pid_file.remove()?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let delivered = process::terminate(pid)?;
        self.pid_file.remove()?;

        if delivered {
            tracing::info!(pid, "stream stopped");
            Ok(pid)
        } else {
            tracing::debug!(pid, "stream process already gone");
            Err(StreamError::ProcessNotFound(pid))
        }
    }

    /// Report the recorded stream without changing anything
    pub fn status(&self) -> Result<StreamState, StreamError> {
        Ok(match self.pid_file.read()? {
            None => StreamState::Idle,
            Some(pid) if process::is_alive(pid) => StreamState::Running(pid),
            Some(pid) => StreamState::Stale(pid),
        })
    }

    /// Clear the way for a new stream. Only a stream that was actually
    /// signalled counts as replaced.
    fn stop_previous(&self) -> Result<Option<u32>, StreamError> {
        match self.stop() {
            Ok(pid) => Ok(Some(pid)),
            Err(StreamError::NotRunning) => Ok(None),
            Err(StreamError::ProcessNotFound(pid)) => {
                tracing::debug!(pid, "removed stale pid file");
                Ok(None)
            }
            Err(StreamError::InvalidPidFile(contents)) => {
                tracing::warn!(%contents, "discarded invalid pid file");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for StreamManager {
    fn default() -> Self {
        Self::new()
    }
}
