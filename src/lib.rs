//! rtsp-streamer - re-stream local videos over RTSP
//!
//! Keeps a small library of `.mp4` files, downloads new ones over HTTP and
//! publishes one at a time to an RTSP server by running ffmpeg.
//!
//! # Modules
//!
//! - `config` - YAML config file and streaming defaults
//! - `models` - Data structures for videos and streams
//! - `library` - Video listing, probing and downloads
//! - `stream` - ffmpeg arguments, PID file and stream lifecycle
//! - `net` - LAN address and RTSP URLs
//! - `tools` - Installation checks
//! - `cli` / `commands` - Command line surface

pub mod cli;
pub mod commands;
pub mod config;
pub mod library;
pub mod models;
pub mod net;
pub mod stream;
pub mod tools;

// Re-export commonly used types
pub use config::Config;
pub use library::{LibraryError, VideoLibrary};
pub use models::{StreamSettings, StreamState, VideoEntry, VideoInfo};
pub use stream::{StreamError, StreamManager};
