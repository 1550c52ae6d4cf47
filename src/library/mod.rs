//! Local video library
//!
//! A flat directory of `.mp4` files. Videos are listed with their probed
//! metadata and new ones are downloaded over HTTP.

pub mod probe;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::models::VideoEntry;
pub use probe::{ProbeError, Prober};

/// Default library directory, relative to the working directory
pub const VIDEO_DIR: &str = "videos";

/// Extension of library files
pub const VIDEO_EXT: &str = "mp4";

/// Errors from library operations
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("No videos directory found. Create '{}/' and add some videos.", .0.display())]
    NoLibrary(PathBuf),
    #[error("Video {0}.mp4 already exists.")]
    AlreadyExists(String),
    #[error("Invalid video name {0:?}")]
    InvalidName(String),
    #[error("Failed to download: {0}")]
    Download(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A completed download
#[derive(Debug, Clone)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: u64,
}

/// The video directory plus the tools to inspect and fill it
#[derive(Debug, Clone)]
pub struct VideoLibrary {
    dir: PathBuf,
    prober: Prober,
    client: reqwest::Client,
}

impl VideoLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prober: Prober::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a custom prober (e.g. a non-default ffprobe path)
    pub fn with_prober(mut self, prober: Prober) -> Self {
        self.prober = prober;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the library file for `name` (given without extension)
    pub fn video_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, VIDEO_EXT))
    }

    /// List videos with metadata, sorted by file name.
    ///
    /// Files ffprobe cannot read are left out.
    pub async fn list(&self) -> Result<Vec<VideoEntry>, LibraryError> {
        if !self.dir.is_dir() {
            return Err(LibraryError::NoLibrary(self.dir.clone()));
        }

        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_video = path.extension().is_some_and(|ext| ext == VIDEO_EXT);
            if is_video && entry.file_type().await?.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let mut videos = Vec::with_capacity(files.len());
        for path in files {
            match self.prober.probe(&path).await {
                Ok(info) => videos.push(VideoEntry {
                    file_name: file_name(&path),
                    path,
                    info,
                }),
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping unreadable video"),
            }
        }

        Ok(videos)
    }

    /// Download `url` into the library as `<name>.mp4`.
    ///
    /// An existing file is never overwritten and no request is made for it.
    /// A partially written file is removed when the transfer fails.
    pub async fn download(&self, url: &str, name: &str) -> Result<Downloaded, LibraryError> {
        validate_name(name)?;

        let dest = self.video_path(name);
        if dest.exists() {
            return Err(LibraryError::AlreadyExists(name.to_string()));
        }
        fs::create_dir_all(&self.dir).await?;

        tracing::info!(url, dest = %dest.display(), "downloading video");

        let response = self.client.get(url).send().await?.error_for_status()?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => LibraryError::AlreadyExists(name.to_string()),
                _ => LibraryError::Io(e),
            })?;

        match write_body(response, &mut file).await {
            Ok(bytes) => {
                tracing::info!(bytes, dest = %dest.display(), "download complete");
                Ok(Downloaded { path: dest, bytes })
            }
            Err(e) => {
                drop(file);
                if let Err(rm) = fs::remove_file(&dest).await {
                    tracing::warn!(dest = %dest.display(), error = %rm, "could not remove partial download");
                }
                Err(e)
            }
        }
    }
}

impl Default for VideoLibrary {
    fn default() -> Self {
        Self::new(VIDEO_DIR)
    }
}

/// Stream the body to `file` chunk by chunk
async fn write_body(mut response: reqwest::Response, file: &mut fs::File) -> Result<u64, LibraryError> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// Names become file names inside the library, so they must stay there
pub fn validate_name(name: &str) -> Result<&str, LibraryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || name.contains("..") || name.contains(['/', '\\']) {
        return Err(LibraryError::InvalidName(name.to_string()));
    }
    Ok(name)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_path() {
        let library = VideoLibrary::new("videos");
        assert_eq!(library.video_path("intro"), PathBuf::from("videos/intro.mp4"));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("big_buck_bunny").is_ok());
        assert!(validate_name("clip.v2").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a..b").is_err());
        assert!(validate_name("..x").is_err());
        assert!(validate_name("../escape").is_err());
        assert!(validate_name("a\\b").is_err());
    }

    #[tokio::test]
    async fn test_list_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        let library = VideoLibrary::new(dir.path().join("videos"));
        match library.list().await {
            Err(LibraryError::NoLibrary(path)) => assert!(path.ends_with("videos")),
            other => panic!("Expected NoLibrary, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_skips_unprobeable_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        let library = VideoLibrary::new(dir.path())
            .with_prober(Prober::with_path("definitely-not-ffprobe"));
        assert!(library.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_rejects_bad_name() {
        let dir = tempfile::tempdir().unwrap();
        let library = VideoLibrary::new(dir.path());
        assert!(matches!(
            library.download("http://127.0.0.1:9/x", "../x").await,
            Err(LibraryError::InvalidName(_))
        ));
    }
}
