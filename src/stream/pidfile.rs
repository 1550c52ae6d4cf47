//! PID record for the active stream
//!
//! A single decimal process id in a file. Present while a stream runs,
//! removed when it is stopped.

use std::io;
use std::path::{Path, PathBuf};

use super::StreamError;

/// Default PID file, relative to the working directory
pub const PID_FILE: &str = "stream.pid";

/// Handle to the PID file on disk
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded PID, `None` when no record exists
    pub fn read(&self) -> Result<Option<u32>, StreamError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        parse_pid(&text)
            .map(Some)
            .ok_or_else(|| StreamError::InvalidPidFile(text.trim().to_string()))
    }

    /// Record a PID, replacing any previous record
    pub fn write(&self, pid: u32) -> io::Result<()> {
        std::fs::write(&self.path, pid.to_string())
    }

    /// Delete the record; a missing file is not an error
    pub fn remove(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Default for PidFile {
    fn default() -> Self {
        Self::new(PID_FILE)
    }
}

/// PIDs 0 and above i32::MAX would address process groups or overflow
/// `pid_t`, so they are treated as invalid records.
fn parse_pid(text: &str) -> Option<u32> {
    let pid: u32 = text.trim().parse().ok()?;
    (pid > 0 && pid <= i32::MAX as u32).then_some(pid)
}
